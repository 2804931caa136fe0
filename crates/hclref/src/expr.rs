//! Expressions of the generated program
//!
//! A small TypeScript shaped expression tree. It only covers what references need: string literals, identifiers,
//! member access and template literals. Printing is left to the code emitter; [std::fmt::Display] renders the
//! expression as source for debugging and the CLI.
use crate::declaration::DeclarationKind;
use crate::reference::Reference;
use crate::util::camel_case;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expr {
    StringLiteral { value: String },
    Identifier { name: String },
    Member { object: Box<Expr>, property: String },
    Template { parts: Vec<TemplatePart> },
}

/// Part of a template literal
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplatePart {
    /// already escaped literal text
    Literal(String),
    Expr(Expr),
}

impl Expr {
    pub fn string(value: impl Into<String>) -> Self {
        Self::StringLiteral {
            value: value.into(),
        }
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Self::Identifier { name: name.into() }
    }

    pub fn member(self, property: impl Into<String>) -> Self {
        Self::Member {
            object: Box::new(self),
            property: property.into(),
        }
    }
}

/// Build the member access chain for a reference
///
/// `module.vpc.subnet_ids` => `vpc.subnetIdsOutput`, `aws_instance.foo.*.id` => `awsInstanceFoo.fqn`
pub fn reference_to_expr(reference: &Reference) -> Expr {
    let mut path = reference.referencee.full.split('.');
    let resource = path.next().unwrap_or_default();
    let _name = path.next();

    let mut expr = Expr::ident(reference.variable_name());
    for (index, member) in path.enumerate() {
        let property = if index == 0 && DeclarationKind::of(resource) == DeclarationKind::Module {
            camel_case(&format!("{member}Output"))
        } else {
            camel_case(member)
        };
        expr = expr.member(property);
    }

    if reference.use_fqn {
        expr = expr.member("fqn");
    }

    expr
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::StringLiteral { value } => {
                let quoted = serde_json::to_string(value).map_err(|_| std::fmt::Error)?;
                f.write_str(&quoted)
            }
            Expr::Identifier { name } => f.write_str(name),
            Expr::Member { object, property } => write!(f, "{object}.{property}"),
            Expr::Template { parts } => {
                f.write_str("`")?;
                for part in parts {
                    match part {
                        TemplatePart::Literal(raw) => f.write_str(raw)?,
                        TemplatePart::Expr(expr) => write!(f, "${{{expr}}}")?,
                    }
                }
                f.write_str("`")
            }
        }
    }
}
