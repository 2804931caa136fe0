use super::VisitScoped;
use crate::declaration::ScopeSet;
use crate::dynamic::{declared_blocks, is_dynamic};
use crate::reference::ResolveError;
use hcl::Value;

/// Recursively visit all string leaves
///
/// Entering a dynamic block extends the scope by the block's loop variable. The first error aborts the walk.
pub trait VisitStrings {
    fn visit_strings(
        &self,
        scope: &ScopeSet,
        visitor: &mut dyn VisitScoped<str>,
    ) -> Result<(), ResolveError>;
}

impl VisitStrings for Value {
    fn visit_strings(
        &self,
        scope: &ScopeSet,
        visitor: &mut dyn VisitScoped<str>,
    ) -> Result<(), ResolveError> {
        match self {
            Value::String(string) => visitor.visit(string, scope),
            Value::Array(items) => items.visit_strings(scope, visitor),
            Value::Object(map) => {
                for (key, value) in map {
                    if !is_dynamic(key, value) {
                        value.visit_strings(scope, visitor)?;
                        continue;
                    }

                    for block in declared_blocks(value) {
                        tracing::trace!(scoped_var = %block.scoped_var, "entering dynamic block");
                        let scope = scope.with(block.scoped_var);
                        block.body.visit_strings(&scope, visitor)?;
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl VisitStrings for [Value] {
    fn visit_strings(
        &self,
        scope: &ScopeSet,
        visitor: &mut dyn VisitScoped<str>,
    ) -> Result<(), ResolveError> {
        for item in self {
            item.visit_strings(scope, visitor)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strings_with_scope() {
        let config: Value = serde_json::from_str(
            r#"{
                "name": "${var.name}",
                "ports": [80, "${var.port}"],
                "dynamic": {
                    "ingress": { "for_each": "${var.rules}", "content": { "cidr": "${ingress.value}" } }
                },
                "enabled": true
            }"#,
        )
        .expect("valid json");

        let mut visited = vec![];
        let mut visitor = |value: &str, scope: &ScopeSet| -> Result<(), ResolveError> {
            visited.push((value.to_string(), scope.iter().collect::<Vec<_>>().join(",")));
            Ok(())
        };
        config
            .visit_strings(&ScopeSet::new(), &mut visitor)
            .expect("visitor never fails");

        assert_eq!(
            visited,
            vec![
                ("${var.name}".to_string(), "".to_string()),
                ("${var.port}".to_string(), "".to_string()),
                ("${var.rules}".to_string(), "ingress".to_string()),
                ("${ingress.value}".to_string(), "ingress".to_string()),
            ]
        );
    }

    #[test]
    fn list_encoded_dynamic_blocks() {
        let config: Value = serde_json::from_str(
            r#"{
                "dynamic": [
                    { "ingress": [ { "content": { "a": "${ingress.value}" } }, { "content": { "b": "${x.y}" } } ] },
                    { "egress": { "iterator": "rule", "content": { "c": "${rule.value}" } } }
                ]
            }"#,
        )
        .expect("valid json");

        let mut visited = vec![];
        let mut visitor = |value: &str, scope: &ScopeSet| -> Result<(), ResolveError> {
            visited.push((value.to_string(), scope.iter().collect::<Vec<_>>().join(",")));
            Ok(())
        };
        config
            .visit_strings(&ScopeSet::new(), &mut visitor)
            .expect("visitor never fails");

        assert_eq!(
            visited,
            vec![
                ("${ingress.value}".to_string(), "ingress".to_string()),
                ("${x.y}".to_string(), "ingress".to_string()),
                ("rule".to_string(), "rule".to_string()),
                ("${rule.value}".to_string(), "rule".to_string()),
            ]
        );
    }

    #[test]
    fn errors_abort() {
        let config: Value = serde_json::from_str(r#"["a", "b", "c"]"#).expect("valid json");
        let mut count = 0;
        let mut visitor = |value: &str, _scope: &ScopeSet| -> Result<(), ResolveError> {
            count += 1;
            if value == "b" {
                return Err(ResolveError::UnresolvableReference {
                    reference: value.to_string(),
                    input: value.to_string(),
                    scoped: vec![],
                });
            }
            Ok(())
        };

        assert!(config.visit_strings(&ScopeSet::new(), &mut visitor).is_err());
        assert_eq!(count, 2);
    }
}
