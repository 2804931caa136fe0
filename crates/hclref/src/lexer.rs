//! Lexer for HCL interpolations
//!
//! Finds every `${ ... }` body in a template string and splits it into [Token]s that carry their byte offsets
//! within the original input. The tokens are then grouped into [Candidate]s: traversal chains such as
//! `aws_instance.foo.id` or `data.aws_ami.ubuntu.0` that may refer to a declaration.
//!
//! This only knows enough of the expression grammar to find traversals. Operators, calls and literals are lexed so
//! they can act as delimiters but are not parsed any further. Quoted strings inside an interpolation are opaque.
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    /// integer digits, also used for numeric traversal steps (`foo.0`)
    Number,
    /// quoted string, including any nested template
    Str,
    Dot,
    /// `.*`
    Splat,
    /// `...`
    Ellipsis,
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    Comma,
    Colon,
    Question,
    /// `=>`
    FatArrow,
    /// `=`
    Assign,
    /// arithmetic, comparison and logical operators
    Operator,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn text<'a>(&self, input: &'a str) -> &'a str {
        &input[self.start..self.end]
    }
}

/// A single step of a traversal chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
    pub numeric: bool,
}

/// A traversal chain that may reference a declaration
///
/// `segments` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub segments: Vec<Segment<'a>>,
    /// token directly after the last segment
    pub followed_by: Option<TokenKind>,
}

impl<'a> Candidate<'a> {
    pub fn texts(&self) -> Vec<&'a str> {
        self.segments.iter().map(|segment| segment.text).collect()
    }

    pub fn span(&self) -> Range<usize> {
        let start = self.segments.first().map_or(0, |s| s.start);
        let end = self.segments.last().map_or(0, |s| s.end);
        start..end
    }
}

impl std::fmt::Display for Candidate<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.texts().join("."))
    }
}

/// Byte ranges of all interpolation bodies in `input`
///
/// `$${` is an escaped marker and does not start an interpolation. An unterminated interpolation runs until the
/// end of the input.
pub fn interpolations(input: &str) -> Vec<Range<usize>> {
    let bytes = input.as_bytes();
    let mut ranges = vec![];
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos..].starts_with(b"$${") {
            pos += 3;
            continue;
        }

        if !bytes[pos..].starts_with(b"${") {
            pos += 1;
            continue;
        }

        let body_start = pos + 2;
        let body_end = find_closing_brace(bytes, body_start).unwrap_or(bytes.len());
        ranges.push(body_start..body_end);
        pos = body_end + 1;
    }

    ranges
}

/// Position of the `}` that closes the brace opened right before `from`
fn find_closing_brace(bytes: &[u8], from: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut pos = from;

    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' if depth == 0 => return Some(pos),
            b'}' => depth -= 1,
            b'"' => {
                pos = skip_string(bytes, pos);
                continue;
            }
            _ => {}
        }
        pos += 1;
    }

    None
}

/// Position right after the string literal starting at `quote`
fn skip_string(bytes: &[u8], quote: usize) -> usize {
    let mut pos = quote + 1;

    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b'"' => return pos + 1,
            b'$' if bytes.get(pos + 1) == Some(&b'{') => match find_closing_brace(bytes, pos + 2) {
                Some(close) => pos = close + 1,
                None => return bytes.len(),
            },
            _ => pos += 1,
        }
    }

    bytes.len()
}

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    end: usize,
}

impl<'a> Lexer<'a> {
    /// Lex `input[range]`, token offsets stay relative to `input`
    pub fn new(input: &'a str, range: Range<usize>) -> Self {
        Self {
            input,
            pos: range.start,
            end: range.end.min(input.len()),
        }
    }

    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = vec![];
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..self.end]
    }

    fn next_token(&mut self) -> Option<Token> {
        let skipped = self.rest().len() - self.rest().trim_start().len();
        self.pos += skipped;

        let rest = self.rest();
        let c = rest.chars().next()?;

        let (kind, len) = match c {
            c if c.is_alphabetic() || c == '_' => {
                let len = rest
                    .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-'))
                    .unwrap_or(rest.len());
                (TokenKind::Ident, len)
            }
            c if c.is_ascii_digit() => {
                let len = rest
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(rest.len());
                (TokenKind::Number, len)
            }
            '"' => {
                let end = skip_string(&self.input.as_bytes()[..self.end], self.pos);
                (TokenKind::Str, end - self.pos)
            }
            '.' if rest.starts_with("...") => (TokenKind::Ellipsis, 3),
            '.' if rest.starts_with(".*") => (TokenKind::Splat, 2),
            '.' => (TokenKind::Dot, 1),
            '[' => (TokenKind::OpenBracket, 1),
            ']' => (TokenKind::CloseBracket, 1),
            '(' => (TokenKind::OpenParen, 1),
            ')' => (TokenKind::CloseParen, 1),
            '{' => (TokenKind::OpenBrace, 1),
            '}' => (TokenKind::CloseBrace, 1),
            ',' => (TokenKind::Comma, 1),
            ':' => (TokenKind::Colon, 1),
            '?' => (TokenKind::Question, 1),
            '=' if rest.starts_with("=>") => (TokenKind::FatArrow, 2),
            '=' if rest.starts_with("==") => (TokenKind::Operator, 2),
            '=' => (TokenKind::Assign, 1),
            '!' | '<' | '>' if rest[1..].starts_with('=') => (TokenKind::Operator, 2),
            '&' if rest.starts_with("&&") => (TokenKind::Operator, 2),
            '|' if rest.starts_with("||") => (TokenKind::Operator, 2),
            '!' | '<' | '>' | '+' | '-' | '*' | '/' | '%' => (TokenKind::Operator, 1),
            c => (TokenKind::Unknown, c.len_utf8()),
        };

        let token = Token {
            kind,
            start: self.pos,
            end: self.pos + len,
        };
        self.pos = token.end;
        Some(token)
    }
}

/// Marks tokens of comprehension loop variables and result expressions
///
/// In `[for k, v in var.map : v.id if v.enabled]` only `var.map` is kept.
fn comprehension_exclusions(input: &str, tokens: &[Token]) -> Vec<bool> {
    let mut excluded = vec![false; tokens.len()];

    for (index, token) in tokens.iter().enumerate() {
        let opens_comprehension = index > 0
            && matches!(
                tokens[index - 1].kind,
                TokenKind::OpenBracket | TokenKind::OpenBrace
            );
        if !opens_comprehension || token.kind != TokenKind::Ident || token.text(input) != "for" {
            continue;
        }

        let mut depth = 0usize;
        let mut keyword_in = None;
        let mut colon = None;
        let mut close = tokens.len();

        for (offset, candidate) in tokens[index + 1..].iter().enumerate() {
            let position = index + 1 + offset;
            match candidate.kind {
                TokenKind::OpenBracket | TokenKind::OpenBrace | TokenKind::OpenParen => depth += 1,
                TokenKind::CloseBracket | TokenKind::CloseBrace | TokenKind::CloseParen
                    if depth == 0 =>
                {
                    close = position;
                    break;
                }
                TokenKind::CloseBracket | TokenKind::CloseBrace | TokenKind::CloseParen => {
                    depth -= 1
                }
                TokenKind::Ident
                    if depth == 0 && keyword_in.is_none() && candidate.text(input) == "in" =>
                {
                    keyword_in = Some(position)
                }
                TokenKind::Colon if depth == 0 && keyword_in.is_some() && colon.is_none() => {
                    colon = Some(position)
                }
                _ => {}
            }
        }

        let (Some(keyword_in), Some(colon)) = (keyword_in, colon) else {
            continue;
        };

        tracing::trace!(
            collection = &input[tokens[keyword_in].end..tokens[colon].start],
            "comprehension found"
        );

        excluded[index..=keyword_in].fill(true);
        excluded[colon..close].fill(true);
    }

    excluded
}

/// Group tokens into traversal chains
fn chains<'a>(input: &'a str, tokens: &[Token]) -> Vec<Candidate<'a>> {
    let excluded = comprehension_exclusions(input, tokens);
    let mut candidates = vec![];
    let mut index = 0;

    while index < tokens.len() {
        let token = &tokens[index];
        let is_chain_start = token.kind == TokenKind::Ident
            && !excluded[index]
            && (index == 0 || tokens[index - 1].kind != TokenKind::Dot);
        if !is_chain_start {
            index += 1;
            continue;
        }

        let mut segments = vec![segment(input, token)];
        let mut next = index + 1;
        while next + 1 < tokens.len()
            && tokens[next].kind == TokenKind::Dot
            && matches!(tokens[next + 1].kind, TokenKind::Ident | TokenKind::Number)
            && !excluded[next + 1]
        {
            segments.push(segment(input, &tokens[next + 1]));
            next += 2;
        }

        candidates.push(Candidate {
            segments,
            followed_by: tokens.get(next).map(|t| t.kind),
        });
        index = next;
    }

    candidates
}

fn segment<'a>(input: &'a str, token: &Token) -> Segment<'a> {
    Segment {
        text: token.text(input),
        start: token.start,
        end: token.end,
        numeric: token.kind == TokenKind::Number,
    }
}

/// All traversal chains inside the interpolations of `input`
///
/// Returns nothing when `input` does not start with an interpolation.
pub fn candidate_spots(input: &str) -> Vec<Candidate<'_>> {
    if !input.starts_with("${") {
        return vec![];
    }

    interpolations(input)
        .into_iter()
        .flat_map(|range| {
            let tokens = Lexer::new(input, range).tokenize();
            chains(input, &tokens)
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input, 0..input.len())
            .tokenize()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn spots(input: &str) -> Vec<String> {
        candidate_spots(input)
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn interpolation_ranges() {
        assert_eq!(interpolations("${var.a}"), vec![2..7]);
        assert_eq!(interpolations("${var.a}-${var.b}"), vec![2..7, 11..16]);
        assert_eq!(interpolations("$${var.a}"), vec![]);
        assert_eq!(interpolations("${{a = 1}}"), vec![2..9]);
        assert_eq!(interpolations("${var.a"), vec![2..7]);
        assert_eq!(interpolations(r#"${format("}", var.a)}"#), vec![2..20]);
    }

    #[test]
    fn punctuation() {
        use TokenKind::*;
        assert_eq!(
            kinds("a.*.b[0]...(x,y)"),
            vec![
                Ident,
                Splat,
                Dot,
                Ident,
                OpenBracket,
                Number,
                CloseBracket,
                Ellipsis,
                OpenParen,
                Ident,
                Comma,
                Ident,
                CloseParen
            ]
        );
        assert_eq!(
            kinds("a >= 1 && !b || c != d ? e : f"),
            vec![
                Ident, Operator, Number, Operator, Operator, Ident, Operator, Ident, Operator,
                Ident, Question, Ident, Colon, Ident
            ]
        );
        assert_eq!(kinds("{ k = v => w }"), vec![OpenBrace, Ident, Assign, Ident, FatArrow, Ident, CloseBrace]);
    }

    #[test]
    fn identifiers_may_contain_dashes() {
        assert_eq!(spots("${aws_s3_bucket.my-bucket.arn}"), vec!["aws_s3_bucket.my-bucket.arn"]);
        assert_eq!(spots("${var.a - 1}"), vec!["var.a"]);
    }

    #[test]
    fn chains_stop_at_splat_and_index() {
        let candidates = candidate_spots("${aws_instance.foo.*.id}");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].to_string(), "aws_instance.foo");
        assert_eq!(candidates[0].followed_by, Some(TokenKind::Splat));
        assert_eq!(candidates[0].span(), 2..18);

        let candidates = candidate_spots("${aws_instance.foo[0].id}");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].followed_by, Some(TokenKind::OpenBracket));
    }

    #[test]
    fn numeric_steps_are_segments() {
        let candidates = candidate_spots("${aws_instance.foo.0.id}");
        assert_eq!(candidates[0].texts(), vec!["aws_instance", "foo", "0", "id"]);
        assert!(candidates[0].segments[2].numeric);
    }

    #[test]
    fn calls_and_operators_delimit() {
        assert_eq!(
            spots("${element(concat(aws_subnet.a.*.id, [var.extra]), count.index)}"),
            vec!["element", "concat", "aws_subnet.a", "var.extra", "count.index"]
        );
        assert_eq!(
            spots("${var.enabled ? local.on : !local.off}"),
            vec!["var.enabled", "local.on", "local.off"]
        );
    }

    #[test]
    fn quoted_strings_are_opaque() {
        assert_eq!(spots(r#"${join(".", var.parts)}"#), vec!["join", "var.parts"]);
        assert_eq!(spots(r#"${lookup(var.m, "a.b")}"#), vec!["lookup", "var.m"]);
    }

    #[test]
    fn comprehension_only_keeps_collection() {
        assert_eq!(
            spots("${[for name, user in var.users : user.role if user.active]}"),
            vec!["var.users"]
        );
        assert_eq!(
            spots("${{for k, v in local.map : k => v.id}}"),
            vec!["local.map"]
        );
        assert_eq!(
            spots("${concat(var.base, [for s in var.extra : s.id])}"),
            vec!["concat", "var.base", "var.extra"]
        );
    }

    #[test]
    fn multiple_interpolations() {
        assert_eq!(spots("${var.a}-${var.b}"), vec!["var.a", "var.b"]);
    }

    #[test]
    fn requires_leading_marker() {
        assert_eq!(spots("prefix-${var.a}"), Vec::<String>::new());
        assert_eq!(spots("plain.text"), Vec::<String>::new());
    }
}
