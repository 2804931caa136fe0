/// Convert an HCL name into the camel case identifier used by generated code
///
/// Words are separated by any non-alphanumeric character and by a lower to upper case transition.
///
/// `aws_instance` => `awsInstance`, `my-bucket` => `myBucket`, `fooBar` => `fooBar`
pub(crate) fn camel_case(input: &str) -> String {
    let mut words: Vec<String> = vec![];
    let mut current = String::new();
    let mut previous_lowercase = false;

    for c in input.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous_lowercase = false;
            continue;
        }

        if c.is_uppercase() && previous_lowercase && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }

        previous_lowercase = c.is_lowercase() || c.is_numeric();
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }

    let mut words = words.into_iter();
    let mut result = words.next().unwrap_or_default().to_lowercase();
    for word in words {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            result.push_str(&chars.as_str().to_lowercase());
        }
    }

    result
}

/// Escape literal text so it can sit inside a template literal
///
/// Only `${` starts an interpolation, a lone `$` is kept as is.
pub(crate) fn escape_template_literal(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    let mut chars = literal.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '`' => escaped.push_str("\\`"),
            '$' if chars.peek() == Some(&'{') => escaped.push_str("\\$"),
            c => escaped.push(c),
        }
    }

    escaped
}
