//! collection of configuration documents and the declarations they contain
//!
//! [ConfigDocuments] tracks
//! - the source path of each document
//! - every top level declaration (`resource`, `data`, `variable`, `locals`, `module`)
//! and keeps them in the order they were loaded. Once added declarations are never removed.
use crate::declaration::DeclarationIndex;
use crate::dynamic::{extract_dynamic_blocks, DynamicBlock};
use crate::reference::{Reference, ResolveError};
use crate::walker::find_used_references;
use hcl::Value;
use indexmap::IndexMap;
use std::path::Path;

/// A declaration and the configuration value of its body
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Declaration {
    /// canonical identifier, e.g. `aws_instance.web` or `var.region`
    pub id: String,
    pub body: Value,
}

#[derive(Default, Debug)]
pub struct ConfigDocuments {
    sources: Vec<Source>,
    declarations: Vec<(usize, Declaration)>,
}

impl ConfigDocuments {
    /// Inserts a parsed document and collects its declarations
    pub fn insert(&mut self, document: Value, path: impl Into<Option<std::path::PathBuf>>) {
        let source_index = self.sources.len();
        self.sources.push(path.into());

        for (block_type, blocks) in entries(&document) {
            match block_type.as_str() {
                "resource" => {
                    for (resource_type, resources) in entries(blocks) {
                        for (name, body) in entries(resources) {
                            self.push(source_index, format!("{resource_type}.{name}"), body);
                        }
                    }
                }
                "data" => {
                    for (data_type, sources) in entries(blocks) {
                        for (name, body) in entries(sources) {
                            self.push(source_index, format!("data.{data_type}.{name}"), body);
                        }
                    }
                }
                "variable" => {
                    for (name, body) in entries(blocks) {
                        self.push(source_index, format!("var.{name}"), body);
                    }
                }
                "locals" => {
                    for (name, expr) in entries(blocks) {
                        self.push(source_index, format!("local.{name}"), expr);
                    }
                }
                "module" => {
                    for (name, body) in entries(blocks) {
                        self.push(source_index, format!("module.{name}"), body);
                    }
                }
                other => tracing::trace!(block_type = other, "not a declaration"),
            }
        }
    }

    fn push(&mut self, source_index: usize, id: String, body: &Value) {
        tracing::trace!(%id, "declaration found");
        self.declarations.push((
            source_index,
            Declaration {
                id,
                body: body.clone(),
            },
        ));
    }

    pub fn declarations(&self) -> impl Iterator<Item = SourceDeclaration<'_>> {
        self.declarations
            .iter()
            .map(|(source_index, declaration)| (&self.sources[*source_index], declaration))
    }

    /// Identifiers of all declarations in load order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.declarations
            .iter()
            .map(|(_, declaration)| declaration.id.as_str())
    }

    pub fn index(&self) -> DeclarationIndex {
        self.ids().collect()
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// References used by each declaration body
    ///
    /// # Errors
    /// Fails on the first reference to something that is not declared in any of the loaded documents.
    pub fn references(&self) -> Result<IndexMap<String, Vec<Reference>>, ResolveError> {
        let index = self.index();
        self.declarations
            .iter()
            .map(|(_, declaration)| {
                let references = find_used_references(&index, &declaration.body)?;
                Ok::<_, ResolveError>((declaration.id.clone(), references))
            })
            .collect()
    }

    /// Dynamic blocks of each declaration body, declarations without any are left out
    pub fn dynamic_blocks(&self) -> IndexMap<String, Vec<DynamicBlock>> {
        self.declarations
            .iter()
            .map(|(_, declaration)| {
                (
                    declaration.id.clone(),
                    extract_dynamic_blocks(&declaration.body),
                )
            })
            .filter(|(_, blocks)| !blocks.is_empty())
            .collect()
    }
}

/// Key value pairs of a block level
///
/// HCL decodes blocks as objects, JSON configuration may also wrap each level in a list of objects.
fn entries(value: &Value) -> Vec<(&String, &Value)> {
    match value {
        Value::Object(map) => map.iter().collect(),
        Value::Array(items) => items.iter().flat_map(entries).collect(),
        _ => vec![],
    }
}

impl ConfigDocuments {
    pub fn load_file(&mut self, file_path: &Path) -> Result<(), LoadError> {
        let file_path = file_path.canonicalize()?;
        tracing::info!(path=%file_path.display(), "loading file");

        let file_contents = std::fs::read_to_string(&file_path)?;
        let is_json = file_path
            .extension()
            .is_some_and(|extension| extension == "json");
        let document: Value = if is_json {
            serde_json::from_str(&file_contents)?
        } else {
            hcl::from_str(&file_contents)?
        };

        self.insert(document, Some(file_path));
        Ok(())
    }

    pub fn load_directory(&mut self, dir_path: &Path) -> Result<(), LoadError> {
        let mut file_paths = vec![];

        let read_dir = std::fs::read_dir(dir_path)?;
        for dir_entry in read_dir {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }

            let file_name = dir_entry.file_name().to_string_lossy().to_string();
            let is_configuration_file = file_name.ends_with(".tf") || file_name.ends_with(".tf.json");
            if !is_configuration_file {
                continue;
            }

            file_paths.push(dir_entry.path());
        }

        if file_paths.is_empty() {
            return Err(LoadError::NoFilesFound);
        }

        // read_dir order is platform dependent
        file_paths.sort();
        for file_path in file_paths {
            self.load_file(&file_path)?;
        }

        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("No files found in directory")]
    NoFilesFound,
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unable to parse hcl file")]
    HclParseFailed(#[from] hcl::Error),
    #[error("Unable to parse json file")]
    JsonParseFailed(#[from] serde_json::Error),
}

impl From<Value> for ConfigDocuments {
    fn from(value: Value) -> Self {
        let mut documents = ConfigDocuments::default();
        documents.insert(value, None);
        documents
    }
}

/// Utility macro to create [ConfigDocuments]
///
/// Create from a single document
/// ```
/// # use hclref::config_documents;
/// config_documents!(r#"variable "region" {}"#);
/// ```
///
/// Create from multiple documents (path required)
/// ```
/// # use hclref::config_documents;
/// config_documents! {
///   "variables.tf" => r#"variable "region" {}"#,
///   "main.tf" => r#"resource "aws_instance" "web" { ami = var.ami }"#
/// };
/// ```
///
/// # Panic
/// Panics on invalid input
///
/// ```should_panic
/// # use hclref::config_documents;
/// config_documents!("not = valid = hcl");
/// ```
#[macro_export]
macro_rules! config_documents {
    // single document without source
    { $expr:expr } => {
        $crate::config_documents::ConfigDocuments::from(
            hcl::from_str::<hcl::Value>($expr).expect("document must parse")
        )
    };
    // multi document with sources
    { $($source:expr => $expr:expr),+ } => {{
        let mut docs = $crate::config_documents::ConfigDocuments::default();
        $(
            docs.insert(
                hcl::from_str::<hcl::Value>($expr).expect("document must parse"),
                Some(std::path::PathBuf::from($source)),
            );
        )+

        docs
    }};
}

pub type Source = Option<std::path::PathBuf>;
pub type SourceDeclaration<'a> = (&'a Source, &'a Declaration);

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn collects_declarations() {
        let documents = config_documents! {r#"
        variable "region" {
          default = "eu-west-1"
        }

        locals {
          name = "web"
          tags = { Name = local.name }
        }

        data "aws_ami" "ubuntu" {
          most_recent = true
        }

        resource "aws_instance" "web" {
          ami = data.aws_ami.ubuntu.id
        }

        module "vpc" {
          source = "./vpc"
        }

        output "ip" {
          value = aws_instance.web.private_ip
        }
        "#};

        assert_eq!(
            documents.ids().collect::<Vec<_>>(),
            vec![
                "var.region",
                "local.name",
                "local.tags",
                "data.aws_ami.ubuntu",
                "aws_instance.web",
                "module.vpc"
            ]
        );
        assert_eq!(documents.source_count(), 1);
    }

    #[test]
    fn json_list_encoding() {
        let document: Value = serde_json::from_str(
            r#"{
                "resource": [{ "aws_instance": [{ "web": [{ "ami": "${var.ami}" }] }] }],
                "variable": { "ami": {} }
            }"#,
        )
        .expect("valid json");
        let documents = ConfigDocuments::from(document);

        assert_eq!(
            documents.ids().collect::<Vec<_>>(),
            vec!["aws_instance.web", "var.ami"]
        );

        let references = documents.references().expect("resolves");
        assert_eq!(references["aws_instance.web"].len(), 1);
        assert_eq!(references["aws_instance.web"][0].referencee.id, "var.ami");
    }

    #[test]
    fn multiple_documents() {
        let documents = config_documents! {
            "variables.tf" => r#"variable "ami" {}"#,
            "main.tf" => r#"resource "aws_instance" "web" { ami = "${var.ami}" }"#
        };

        assert_eq!(documents.source_count(), 2);
        let sources: Vec<_> = documents
            .declarations()
            .map(|(source, declaration)| (source.clone(), declaration.id.as_str()))
            .collect();
        assert_eq!(
            sources,
            vec![
                (Some(PathBuf::from("variables.tf")), "var.ami"),
                (Some(PathBuf::from("main.tf")), "aws_instance.web"),
            ]
        );
    }

    #[test]
    fn repeated_dynamic_blocks() {
        let documents = config_documents! {r#"
        variable "a" {}
        variable "b" {}

        resource "aws_sg" "web" {
          dynamic "setting" {
            for_each = var.a
            content {
              name = setting.value
            }
          }

          dynamic "setting" {
            for_each = var.b
            content {
              name = setting.key
            }
          }
        }
        "#};

        let references = documents.references().expect("resolves");
        let full: Vec<_> = references["aws_sg.web"]
            .iter()
            .map(|reference| reference.referencee.full.as_str())
            .collect();
        assert_eq!(full, vec!["var.a", "var.b"]);
        assert_eq!(documents.dynamic_blocks()["aws_sg.web"].len(), 2);
    }

    #[test]
    fn dynamic_blocks_per_declaration() {
        let document: Value = serde_json::from_str(
            r#"{
                "resource": {
                    "aws_security_group": {
                        "web": { "dynamic": { "ingress": { "for_each": "${var.ports}", "content": {} } } },
                        "db": { "name": "db" }
                    }
                },
                "variable": { "ports": {} }
            }"#,
        )
        .expect("valid json");
        let documents = ConfigDocuments::from(document);

        let blocks = documents.dynamic_blocks();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks["aws_security_group.web"][0].scoped_var, "ingress");
    }
}
