//! Collect the references of a whole declaration body
use crate::declaration::{DeclarationIndex, ScopeSet};
use crate::reference::{extract_references, Reference, ResolveError};
use crate::visit::VisitStrings;

/// All references to declarations found in the string leaves of `item`
///
/// Leaves inside dynamic blocks are resolved with the loop variables of all enclosing blocks in scope, so
/// `ingress.value` inside `dynamic "ingress"` is dropped instead of failing to resolve.
///
/// # Errors
/// Aborts with the first reference that is neither declared nor scoped.
#[tracing::instrument(level = "trace", skip_all)]
pub fn find_used_references(
    index: &DeclarationIndex,
    item: &hcl::Value,
) -> Result<Vec<Reference>, ResolveError> {
    let mut references = vec![];

    let mut collect = |value: &str, scope: &ScopeSet| -> Result<(), ResolveError> {
        references.extend(extract_references(value, index, scope)?);
        Ok(())
    };
    item.visit_strings(&ScopeSet::new(), &mut collect)?;

    tracing::debug!(count = references.len(), "references collected");
    Ok(references)
}
