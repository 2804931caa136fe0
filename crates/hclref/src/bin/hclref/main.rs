mod cli;

use hclref::config_documents::ConfigDocuments;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("HCLREF_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::References(references_cli) => references(references_cli),
        cli::Command::Expression(expression_cli) => expression(expression_cli),
        cli::Command::Dynamic(dynamic_cli) => dynamic(dynamic_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn references(cli: cli::ReferencesCommand) -> anyhow::Result<()> {
    let documents = load(&cli.input)?;
    let references = documents.references()?;

    output(&cli.output, &references)?;
    Ok(())
}

pub fn expression(cli: cli::ExpressionCommand) -> anyhow::Result<()> {
    let documents = load(&cli.input)?;
    let scope: hclref::ScopeSet = cli.scoped.iter().map(String::as_str).collect();

    let expr = hclref::convert_expression(&cli.expression, &documents.index(), &scope)?;

    match cli.format {
        cli::ExpressionFormat::Ts => println!("{expr}"),
        cli::ExpressionFormat::Json => serde_json::to_writer_pretty(std::io::stdout(), &expr)?,
        cli::ExpressionFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), &expr)?,
    };

    Ok(())
}

pub fn dynamic(cli: cli::DynamicCommand) -> anyhow::Result<()> {
    let documents = load(&cli.input)?;
    let blocks = documents.dynamic_blocks();

    output(&cli.output, &blocks)?;
    Ok(())
}

fn load(input: &cli::InputArgs) -> anyhow::Result<ConfigDocuments> {
    if !input.workdir && input.files.is_empty() && input.directories.is_empty() {
        let stdin = std::io::read_to_string(std::io::stdin())?;
        let document: hcl::Value = hcl::from_str(&stdin)?;
        return Ok(document.into());
    }

    let mut documents = ConfigDocuments::default();

    if input.workdir {
        documents.load_directory(&std::env::current_dir()?)?;
    }

    for file_path in &input.files {
        documents.load_file(file_path)?;
    }

    for dir_path in &input.directories {
        documents.load_directory(dir_path)?;
    }

    anyhow::ensure!(documents.source_count() > 0, "No files loaded");

    Ok(documents)
}

fn output(output: &cli::OutputArgs, value: &impl serde::Serialize) -> anyhow::Result<()> {
    match output.format {
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), value)?,
        cli::OutputFormat::Json => serde_json::to_writer_pretty(std::io::stdout(), value)?,
    };

    Ok(())
}
