//! Turn an interpolation string and its references into an expression
use crate::declaration::{DeclarationIndex, ScopeSet};
use crate::expr::{reference_to_expr, Expr, TemplatePart};
use crate::reference::{extract_references, Reference, ResolveError};
use crate::util::escape_template_literal;

/// Merge the literal parts of `input` with its references
///
/// - no references: the input as string literal
/// - a single reference making up the whole interpolation: the bare expression
/// - anything else: a template literal
///
/// References to scoped variables are ignored.
pub fn references_to_expr(input: &str, references: &[Reference], scope: &ScopeSet) -> Expr {
    let mut references: Vec<&Reference> = references
        .iter()
        .filter(|reference| !scope.contains(&reference.referencee.id))
        .collect();
    references.sort_by_key(|reference| reference.start);

    let [first, ..] = references.as_slice() else {
        return Expr::string(input);
    };

    let spans_whole_interpolation = references.len() == 1
        && first.start == "${".len()
        && first.end == input.len().saturating_sub("}".len())
        && !first.use_fqn;
    if spans_whole_interpolation {
        return reference_to_expr(first);
    }

    let mut parts = vec![];
    let mut last_end = 0;

    for reference in references {
        if reference.start > last_end {
            let literal = &input[last_end..reference.start];
            parts.push(TemplatePart::Literal(escape_template_literal(literal)));
        }

        parts.push(TemplatePart::Expr(reference_to_expr(reference)));
        last_end = last_end.max(reference.end);
    }

    if last_end < input.len() {
        let literal = &input[last_end..];
        parts.push(TemplatePart::Literal(escape_template_literal(literal)));
    }

    Expr::Template { parts }
}

/// Resolve all references in `input` and build its expression
///
/// # Errors
/// Fails if `input` contains a reference that is neither declared nor scoped.
#[tracing::instrument(level = "trace", skip(index))]
pub fn convert_expression(
    input: &str,
    index: &DeclarationIndex,
    scope: &ScopeSet,
) -> Result<Expr, ResolveError> {
    let references = extract_references(input, index, scope)?;
    Ok(references_to_expr(input, &references, scope))
}
