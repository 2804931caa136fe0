//! Discovery of `dynamic` blocks
//!
//! ```hcl
//! resource "aws_security_group" "web" {
//!   dynamic "ingress" {
//!     for_each = var.ports
//!     content {
//!       from_port = ingress.value
//!     }
//!   }
//! }
//! ```
//!
//! A dynamic block repeats its `content` for every element of `for_each`. Inside the content the block name (or the
//! name given by `iterator`) is a loop variable, not a reference to another declaration.
use hcl::Value;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DynamicBlock {
    /// dot separated location of the block within the configuration value, ending with the block name
    ///
    /// There is no leading dot: a block at the top level has the path `ingress`, not `.ingress`. Blocks sharing a
    /// label share their path and keep their declaration order.
    pub path: String,
    pub for_each: Value,
    pub content: Value,
    /// loop variable introduced by the block
    pub scoped_var: String,
}

/// A block declared under a `dynamic` key
pub(crate) struct DeclaredBlock<'a> {
    pub name: &'a str,
    pub scoped_var: String,
    pub body: &'a Value,
}

impl DeclaredBlock<'_> {
    fn get(&self, key: &str) -> Value {
        match self.body {
            Value::Object(body) => body.get(key).cloned().unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }
}

/// All blocks declared below a `dynamic` key
///
/// HCL decodes repeated blocks with the same label as a list of bodies, JSON configuration may additionally wrap
/// the `dynamic` value itself in a list of objects. Every body is a block of its own.
pub(crate) fn declared_blocks(dynamic: &Value) -> Vec<DeclaredBlock<'_>> {
    match dynamic {
        Value::Array(items) => items.iter().flat_map(declared_blocks).collect(),
        Value::Object(labels) => labels
            .iter()
            .flat_map(|(name, body)| match body {
                Value::Array(bodies) => bodies.iter().map(|body| declared_block(name, body)).collect(),
                body => vec![declared_block(name, body)],
            })
            .collect(),
        _ => vec![],
    }
}

fn declared_block<'a>(name: &'a str, body: &'a Value) -> DeclaredBlock<'a> {
    let scoped_var = match body {
        Value::Object(body) => body.get("iterator").and_then(iterator_name),
        _ => None,
    }
    .unwrap_or_else(|| name.to_string());

    DeclaredBlock {
        name,
        scoped_var,
        body,
    }
}

/// Is `key` / `value` a `dynamic` block declaration
pub(crate) fn is_dynamic(key: &str, value: &Value) -> bool {
    key == "dynamic" && matches!(value, Value::Object(_) | Value::Array(_))
}

/// `iterator = foo` is either kept as plain string or as interpolation `${foo}`
fn iterator_name(value: &Value) -> Option<String> {
    let Value::String(name) = value else {
        return None;
    };

    let name = name
        .strip_prefix("${")
        .and_then(|name| name.strip_suffix('}'))
        .unwrap_or(name);

    Some(name.trim().to_string())
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

/// Find all dynamic blocks in a configuration value
///
/// Discovery does not descend into the blocks it found, nested dynamic blocks are part of the outer content.
pub fn extract_dynamic_blocks(config: &Value) -> Vec<DynamicBlock> {
    let mut blocks = vec![];
    collect(config, "", &mut blocks);
    blocks
}

fn collect(config: &Value, path: &str, blocks: &mut Vec<DynamicBlock>) {
    match config {
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                collect(item, &join(path, &index.to_string()), blocks);
            }
        }
        Value::Object(map) => {
            for (key, value) in map {
                if is_dynamic(key, value) {
                    for block in declared_blocks(value) {
                        let dynamic_block = DynamicBlock {
                            path: join(path, block.name),
                            for_each: block.get("for_each"),
                            content: block.get("content"),
                            scoped_var: block.scoped_var,
                        };
                        tracing::debug!(path = %dynamic_block.path, scoped_var = %dynamic_block.scoped_var, "dynamic block found");
                        blocks.push(dynamic_block);
                    }
                    continue;
                }

                collect(value, &join(path, key), blocks);
            }
        }
        _ => {}
    }
}
