//! visitor pattern helpers
mod visit_strings;
pub use visit_strings::VisitStrings;

use crate::declaration::ScopeSet;
use crate::reference::ResolveError;

/// Visitor that is handed its subjects together with the dynamic block scope they appear in
pub trait VisitScoped<T: ?Sized> {
    fn visit(&mut self, value: &T, scope: &ScopeSet) -> Result<(), ResolveError>;
}

// blanket impl for FnMut
impl<T, F> VisitScoped<T> for F
where
    T: ?Sized,
    F: FnMut(&T, &ScopeSet) -> Result<(), ResolveError>,
{
    fn visit(&mut self, value: &T, scope: &ScopeSet) -> Result<(), ResolveError> {
        self(value, scope)
    }
}
