//! hclref cli interface

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; hclref ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the references of every declaration
    ///
    /// Reads HCL from stdin unless any other source is provided (via --input-*)
    #[command(alias = "refs")]
    References(ReferencesCommand),

    /// Convert a single interpolation string into an expression
    ///
    /// Declarations are taken from the loaded configuration
    #[command(alias = "expr")]
    Expression(ExpressionCommand),

    /// List the dynamic blocks of every declaration
    Dynamic(DynamicCommand),
}

#[derive(Parser, Debug)]
pub struct ReferencesCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct DynamicCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct ExpressionCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    /// Output format, `ts` prints the expression as source
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: ExpressionFormat,

    /// Loop variable of an enclosing dynamic block
    ///
    /// Can be specified multiple times
    #[clap(short = 's', long = "scoped")]
    pub scoped: Vec<String>,

    /// Interpolation string to convert, e.g. '${aws_instance.web.id}'
    pub expression: String,
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Load configuration files from work directory
    #[clap(short = 'w', long = "input-workdir")]
    pub workdir: bool,

    /// Load a file
    #[clap(short = 'f', long = "input-file")]
    pub files: Vec<PathBuf>,

    /// Load configuration files from given directory
    #[clap(short = 'd', long = "input-dir")]
    pub directories: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    Json,
    #[default]
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum ExpressionFormat {
    #[default]
    Ts,
    Json,
    Yaml,
}

impl std::fmt::Display for ExpressionFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpressionFormat::Ts => f.write_str("ts"),
            ExpressionFormat::Json => f.write_str("json"),
            ExpressionFormat::Yaml => f.write_str("yaml"),
        }
    }
}
