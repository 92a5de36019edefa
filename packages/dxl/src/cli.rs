//! Command-line interface for the DXL parser.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use console::style;

use crate::ast::Document;
use crate::config::ParseOptions;
use crate::error::Result;
use crate::parser::parse_reader_with_stats;
use crate::registry::ParseStats;
use crate::registry::REGISTRY;

/// DXL parser - Inspect and validate DXL optimizer documents.
#[derive(Parser)]
#[command(name = "dxl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format of the `parse` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Section summary with an indented operator tree
    #[default]
    Summary,
    Json,
    Yaml,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a DXL file and print the resulting document.
    Parse {
        /// Path to the DXL file
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
        format: OutputFormat,

        /// Maximum element nesting depth
        #[arg(long)]
        max_depth: Option<usize>,

        /// Reject elements outside the DXL namespace
        #[arg(long)]
        strict: bool,
    },

    /// Validate a DXL file and report the first error.
    Check {
        /// Path to the DXL file
        file: PathBuf,
    },

    /// List every tag the parser recognizes.
    Tags,
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            file,
            format,
            max_depth,
            strict,
        } => {
            let mut options = ParseOptions::new().with_strict_namespace(strict);
            if let Some(depth) = max_depth {
                options = options.with_max_depth(depth);
            }
            parse_command(&file, format, &options)
        }
        Commands::Check { file } => check_command(&file),
        Commands::Tags => {
            tags_command();
            Ok(())
        }
    }
}

/// Render a document in the requested format.
///
/// # Errors
/// Serialization errors for the JSON and YAML formats.
pub fn render(document: &Document, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Summary => document.summary(),
        OutputFormat::Json => serde_json::to_string_pretty(document)? + "\n",
        OutputFormat::Yaml => serde_yaml_ng::to_string(document)?,
    })
}

/// Stream one file through the parser.
fn parse_path(file: &Path, options: &ParseOptions) -> Result<(Document, ParseStats)> {
    let source = BufReader::new(File::open(file)?);
    parse_reader_with_stats(source, options)
}

/// Execute the parse command.
fn parse_command(file: &Path, format: OutputFormat, options: &ParseOptions) -> Result<()> {
    let (document, stats) = parse_path(file, options)?;

    if format == OutputFormat::Summary {
        println!(
            "{} {} from {}",
            style("Parsed").bold(),
            style(document.section_name()).cyan(),
            style(file.display()).green()
        );
        println!(
            "  Events: {}  Nodes: {}  Max depth: {}",
            stats.events, stats.nodes_built, stats.max_depth
        );
        println!();
    }
    print!("{}", render(&document, format)?);
    Ok(())
}

/// Execute the check command.
fn check_command(file: &Path) -> Result<()> {
    let (document, stats) = parse_path(file, &ParseOptions::new())?;
    println!(
        "{} {} ({} section, {} events)",
        style("OK").green().bold(),
        file.display(),
        document.section_name(),
        stats.events
    );
    Ok(())
}

/// Execute the tags command.
fn tags_command() {
    for token in REGISTRY.registered_tags() {
        let family = REGISTRY
            .kind_for(token)
            .map(|kind| kind.family().to_string())
            .unwrap_or_default();
        println!("{:<32} {}", token.as_str(), style(family).dim());
    }
}
