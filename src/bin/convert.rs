//! Schema Conversion CLI
//!
//! Converts JSON Schema files into OpenAPI 3.0 component schemas.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use schema_to_openapi::config::{OutputFormat, SchemaConfig, TupleItemsPolicy};
use schema_to_openapi::{dereference, Converter, OpenApiDocument};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-to-openapi")]
#[command(about = "Convert JSON Schema documents into OpenAPI 3.0 component schemas")]
struct Cli {
    /// Configuration file, layered over the default locations
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a JSON Schema file
    Convert {
        /// JSON Schema file
        input: PathBuf,

        /// Component name of the root schema (default: the input file stem)
        #[arg(short, long)]
        name: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Wrap the components in a minimal OpenAPI document
        #[arg(long)]
        document: bool,

        /// Write compact JSON
        #[arg(long)]
        compact: bool,

        /// How tuple-form `items` are collapsed
        #[arg(long, value_enum)]
        tuple_items: Option<TupleItemsPolicy>,

        /// Do not resolve local `$ref`s before converting
        #[arg(long)]
        no_deref: bool,
    },

    /// Inspect or create configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,

    /// Write the default configuration to a file
    Init {
        #[arg(default_value = "schema-to-openapi.toml")]
        path: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_ref().map(|p| p.to_string_lossy().into_owned());
    let mut config = SchemaConfig::load_from(config_path.as_deref())
        .context("Failed to load configuration")?;

    match cli.command {
        Commands::Convert {
            input,
            name,
            output,
            document,
            compact,
            tuple_items,
            no_deref,
        } => {
            if document {
                config.output.document = true;
            }
            if compact {
                config.output.format = OutputFormat::Compact;
            }
            if let Some(policy) = tuple_items {
                config.convert.tuple_items = policy;
            }

            let name = match name {
                Some(name) => name,
                None => default_name(&input)?,
            };
            let rendered = convert_file(&input, &name, !no_deref, &config)?;

            match output {
                Some(path) => fs::write(&path, rendered + "\n")
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{}", rendered),
            }
            Ok(())
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                print!("{}", config.to_toml()?);
                Ok(())
            }
            ConfigAction::Init { path } => {
                SchemaConfig::default()
                    .save(&path.to_string_lossy())
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Wrote default configuration to {}", path.display());
                Ok(())
            }
        },
    }
}

fn default_name(input: &Path) -> anyhow::Result<String> {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .with_context(|| format!("Cannot derive a component name from {}", input.display()))
}

/// Read, convert and render one schema file
fn convert_file(
    input: &Path,
    name: &str,
    deref: bool,
    config: &SchemaConfig,
) -> anyhow::Result<String> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let schema: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse JSON in {}", input.display()))?;

    let converter = Converter::new(config.convert.clone());
    let components = if deref {
        let doc = dereference(&schema)?;
        converter.convert_document(&doc, name)?
    } else {
        converter.convert(&schema, name)?
    };

    let value = if config.output.document {
        serde_json::to_value(OpenApiDocument::new(components, &config.output))?
    } else {
        serde_json::to_value(&components)?
    };

    let rendered = match config.output.format {
        OutputFormat::Pretty => serde_json::to_string_pretty(&value)?,
        OutputFormat::Compact => serde_json::to_string(&value)?,
    };
    Ok(rendered)
}
