//! `proofmark` CLI - check a document and print annotation regions

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "proofmark")]
#[command(about = "Proofread laid-out documents and map errors back to page positions")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/proofmark/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line per finding
    #[default]
    Compact,
    /// Full report as JSON
    Json,
    /// Human-readable report with geometry
    Full,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a document and print annotation regions
    Check {
        /// Input file (.json character dump, .pdf, or plain text); "-" for stdin
        input: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Compact)]
        format: OutputFormat,

        /// Provider order, overriding the config (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        providers: Option<Vec<String>>,

        /// Maximum characters per chunk
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Chunks checked at once
        #[arg(long)]
        concurrency: Option<usize>,

        /// Keep findings in skipped categories (e.g. SPACING)
        #[arg(long)]
        all_categories: bool,
    },

    /// Print the normalized text and its anchor map
    Normalize {
        /// Input file; "-" for stdin
        input: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Compact)]
        format: OutputFormat,
    },

    /// List checking providers and whether they are usable
    Providers,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON on stdout stays parseable
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let config = proofmark::Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Check {
            input,
            format,
            providers,
            chunk_size,
            concurrency,
            all_categories,
        } => {
            let overrides = cmd::check::Overrides {
                providers,
                chunk_size,
                concurrency,
                all_categories,
            };
            cmd::check::cmd_check(config, &input, format, overrides).await?;
        }
        Commands::Normalize { input, format } => {
            cmd::normalize::cmd_normalize(&config, &input, format)?;
        }
        Commands::Providers => {
            cmd::providers::cmd_providers(&config);
        }
    }

    Ok(())
}
