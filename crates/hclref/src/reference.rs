//! Resolve traversals inside interpolations to declarations
use crate::declaration::{variable_name, DeclarationIndex, ScopeSet};
use crate::lexer::{self, Candidate, TokenKind};

/// A resolved reference to a declaration inside an interpolation string
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, derive_new::new)]
pub struct Reference {
    /// byte offset of the first character of the reference
    pub start: usize,
    /// byte offset after the last character of the reference
    pub end: usize,
    pub referencee: Referencee,
    /// refer to the identity of the declaration rather than to one of its values
    pub use_fqn: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, derive_new::new)]
pub struct Referencee {
    /// canonical identifier of the referenced declaration
    pub id: String,
    /// the dotted path actually referenced
    pub full: String,
}

impl Reference {
    /// Name of the variable generated code uses for the referenced declaration
    pub fn variable_name(&self) -> String {
        let mut parts = self.referencee.full.split('.');
        let resource = parts.next().unwrap_or_default();
        let name = parts.next().unwrap_or_default();
        variable_name(resource, name)
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}..{}]", self.referencee.full, self.start, self.end)?;
        if self.use_fqn {
            f.write_str(" fqn")?;
        }
        Ok(())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Found a reference that is unknown: `{reference}` in {input:?} is not declared (scoped: {scoped:?})")]
    UnresolvableReference {
        reference: String,
        input: String,
        scoped: Vec<String>,
    },
}

/// Find all references to declarations in `input`
///
/// References that resolve to a variable of `scope` are local to a dynamic block and are left out.
///
/// # Errors
/// A traversal that matches neither a declaration nor a scoped variable aborts with
/// [ResolveError::UnresolvableReference]. The declaration index is expected to be complete.
#[tracing::instrument(level = "trace", skip(index))]
pub fn extract_references(
    input: &str,
    index: &DeclarationIndex,
    scope: &ScopeSet,
) -> Result<Vec<Reference>, ResolveError> {
    let mut references = vec![];

    for candidate in lexer::candidate_spots(input) {
        if let Some(reference) = resolve(input, &candidate, index, scope)? {
            tracing::debug!(%reference, "reference found");
            references.push(reference);
        }
    }

    Ok(references)
}

fn resolve(
    input: &str,
    candidate: &Candidate<'_>,
    index: &DeclarationIndex,
    scope: &ScopeSet,
) -> Result<Option<Reference>, ResolveError> {
    let segments = candidate.texts();

    if segments.len() < 2
        || candidate.followed_by == Some(TokenKind::Ellipsis)
        || matches!(segments[0], "count" | "each")
    {
        tracing::trace!(%candidate, "not a reference");
        return Ok(None);
    }

    let id = match index.lookup(&segments) {
        Some(id) => id,
        None if scope.lookup(&segments).is_some() => {
            tracing::trace!(%candidate, "scoped variable");
            return Ok(None);
        }
        None => {
            return Err(ResolveError::UnresolvableReference {
                reference: candidate.to_string(),
                input: input.to_string(),
                scoped: scope.iter().map(ToString::to_string).collect(),
            })
        }
    };

    let numeric_accessor = candidate.segments.iter().position(|s| s.numeric);
    let canonical = match numeric_accessor {
        Some(position) => &candidate.segments[..position.min(2)],
        None => &candidate.segments[..],
    };

    let full = canonical
        .iter()
        .map(|segment| segment.text)
        .collect::<Vec<_>>()
        .join(".");
    let start = canonical.first().map_or(0, |s| s.start);
    let end = canonical.last().map_or(0, |s| s.end);

    let use_fqn = matches!(
        candidate.followed_by,
        Some(TokenKind::Splat | TokenKind::OpenBracket)
    ) || numeric_accessor.is_some()
        || canonical.len() < 3;

    Ok(Some(Reference::new(
        start,
        end,
        Referencee::new(id.to_string(), full),
        use_fqn,
    )))
}
