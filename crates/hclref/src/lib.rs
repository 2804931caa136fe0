//! # hclref - references in HCL interpolations
//!
//! Find, resolve and convert references to declarations inside HCL / Terraform interpolation strings.
//!
//! ## Introduction for developers
//!
//! Read this to understand how `hclref` works internally.
//!
//! ### Terms
//!
//! - a `declaration` is anything other parts of a configuration can refer to. It is identified by a dotted name:
//!   - `var.<name>` for variables
//!   - `local.<name>` for locals
//!   - `module.<name>` for modules
//!   - `data.<type>.<name>` for data sources
//!   - `<type>.<name>` for resources
//! - an `interpolation` is the `${ ... }` part of a string. Parsers such as [hcl] keep expressions that are not
//!   literals as interpolation strings, e.g. `ami = var.ami` is read as `"${var.ami}"`.
//! - a `reference` is a traversal inside an interpolation that names a declaration
//! - a `dynamic block` repeats its content for each element of a collection and introduces a loop variable that
//!   is only valid inside the block
//!
//! ### Finding references
//!
//! see [reference::extract_references]
//!
//! [lexer] locates the interpolations of a string and splits their bodies into tokens. Tokens are grouped into
//! traversal chains like `aws_instance.web.private_ip`. Every chain that is not a loop meta variable (`count.*`,
//! `each.*`) is looked up in a [declaration::DeclarationIndex], or failing that in the [declaration::ScopeSet] of
//! enclosing dynamic blocks. A chain that is found in neither is an error: the index is expected to know all
//! declarations of the configuration.
//!
//! | **input**                      | **full**                 | **use_fqn** |
//! |--------------------------------|--------------------------|-------------|
//! | `${aws_instance.web.id}`       | `aws_instance.web.id`    | no          |
//! | `${aws_instance.web.*.id}`     | `aws_instance.web`       | yes         |
//! | `${aws_instance.web[0].id}`    | `aws_instance.web`       | yes         |
//! | `${var.region}`                | `var.region`             | yes         |
//!
//! `use_fqn` marks references where generated code has to use the identity of the declaration (its fully
//! qualified name) instead of one of its values.
//!
//! ### Building expressions
//!
//! see [template::references_to_expr]
//!
//! Each reference becomes a member access chain on the variable that generated code defines for the declaration
//! ([expr::reference_to_expr]). A string that is exactly one reference becomes that expression, anything else
//! becomes a template literal with the references spliced in.
//!
//! ### Walking configuration values
//!
//! [walker::find_used_references] visits all string leaves of a declaration body ([visit::VisitStrings]) and
//! extends the scope whenever it enters a dynamic block. [dynamic::extract_dynamic_blocks] lists the dynamic
//! blocks themselves.
//!
//! [config_documents::ConfigDocuments] loads `.tf` and `.tf.json` files and collects their declarations.
//!
pub mod config_documents;
pub mod declaration;
pub mod dynamic;
pub mod expr;
pub mod lexer;
pub mod reference;
pub mod template;
mod util;
pub mod visit;
pub mod walker;

pub use declaration::{DeclarationIndex, ScopeSet};
pub use expr::Expr;
pub use reference::{extract_references, Reference, ResolveError};
pub use template::{convert_expression, references_to_expr};
