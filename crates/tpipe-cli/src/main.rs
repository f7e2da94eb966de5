//! tpipe CLI - Command-line interface
//!
//! Usage:
//!   tpipe segment <file.html>
//!   tpipe extract <annotations.json> [--parallel]
//!   tpipe roots <annotations.json>
//!   tpipe profile <annotations.json>

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use tpipe_core::{AppConfig, JsonAnnotations, LoggingConfig};
use tpipe_extractor::{ExtractionStats, ParsedText, SentenceSummary, StructureExtractor};
use tpipe_parser::ParserRegistry;

#[derive(Parser)]
#[command(name = "tpipe")]
#[command(about = "Structural metadata extraction from annotated text")]
#[command(version)]
struct Cli {
    /// TOML configuration file (environment variables override it)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a document into text segments
    Segment {
        /// HTML or plain text file
        path: PathBuf,
    },
    /// Extract sentence roots, subjects and objects
    Extract {
        /// Annotator output in JSON
        path: PathBuf,

        /// Process sentences in parallel
        #[arg(long)]
        parallel: bool,
    },
    /// List root-labelled tokens with their heads
    Roots {
        /// Annotator output in JSON
        path: PathBuf,
    },
    /// Evaluate sentence classification predicates
    Profile {
        /// Annotator output in JSON
        path: PathBuf,
    },
}

#[derive(Serialize)]
struct ExtractReport {
    sentences: Vec<SentenceSummary>,
    stats: ExtractionStats,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    init_tracing(&config.logging);

    match cli.command {
        Commands::Segment { path } => {
            let registry = ParserRegistry::with_defaults(config.segmentation.clone());
            let document = registry
                .parse(&path)
                .with_context(|| format!("Failed to segment {}", path.display()))?;

            tracing::info!(
                "Segmented {} ({:?}) into {} segments",
                document.file_path,
                document.title.as_deref().unwrap_or("untitled"),
                document.segments.len()
            );
            for segment in &document.segments {
                println!("{}", serde_json::to_string(segment)?);
            }
        }
        Commands::Extract { path, parallel } => {
            let mut extraction = config.extraction.clone();
            extraction.parallel |= parallel;

            let parsed = extract_file(&path, StructureExtractor::new(extraction))?;
            let report = ExtractReport {
                sentences: parsed.summaries(),
                stats: parsed.stats,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Roots { path } => {
            let parsed = extract_file(&path, StructureExtractor::new(config.extraction.clone()))?;
            println!("{}", serde_json::to_string_pretty(&parsed.root_links())?);
        }
        Commands::Profile { path } => {
            let parsed = extract_file(&path, StructureExtractor::new(config.extraction.clone()))?;
            println!("{}", serde_json::to_string_pretty(&parsed.profiles())?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

/// Logs go to stderr so stdout stays machine-readable
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_file(logging.include_location)
        .with_line_number(logging.include_location);

    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn extract_file(path: &Path, extractor: StructureExtractor) -> anyhow::Result<ParsedText> {
    let annotations = JsonAnnotations::from_file(path)
        .with_context(|| format!("Failed to load annotations from {}", path.display()))?;

    extractor
        .extract(annotations.document())
        .with_context(|| format!("Failed to extract structure from {}", path.display()))
}
