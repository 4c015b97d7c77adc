//! NFTNET CLI - Holder-overlap networks of NFT collections
//!
//! Fetches the most traded collections, resolves their holders under the
//! data sources' rate limits, and links collections that share holders.

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::*;
use config::NftnetConfig;
use output::OutputFormat;

/// Map NFT collections by the holders they share.
#[derive(Parser)]
#[command(name = "nftnet")]
#[command(author, version)]
#[command(about = "Map NFT collections by the holders they share")]
#[command(propagate_version = true)]
#[command(after_help = "Examples:
  nftnet generate --limit 100              Analyze the top 100 collections
  nftnet generate -m 10 -o network.json    Require 10 shared holders per edge
  nftnet summary network.json              Rankings for a saved network
  nftnet details 0xabc...                  Look up a single collection")]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Output format (overrides config default)
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the holder-overlap network and save it as JSON
    #[command(visible_alias = "gen")]
    Generate {
        /// Number of top collections (by 30-day volume) to analyze
        #[arg(short, long, default_value_t = generate::DEFAULT_LIMIT)]
        limit: usize,

        /// Minimum shared holders for two collections to be linked
        #[arg(short, long, default_value_t = generate::DEFAULT_MIN_SHARED_HOLDERS)]
        min_shared_holders: usize,

        /// Output file (default: nftnet_network_<timestamp>.json)
        #[arg(short, long)]
        output: Option<String>,

        /// Fail on .nftnetrc.toml errors instead of using defaults
        #[arg(long)]
        strict: bool,
    },

    /// Summarize a saved network document
    #[command(visible_alias = "sum")]
    Summary {
        /// Network document produced by `nftnet generate`
        file: String,

        /// Entries per ranking
        #[arg(short = 'n', long, default_value_t = summary::DEFAULT_TOP)]
        top: usize,
    },

    /// Show details for a single collection
    Details {
        /// Collection contract address
        id: String,
    },

    /// Generate shell completion scripts
    Completions {
        #[arg(value_enum)]
        shell: completions::Shell,
    },
}

impl Cli {
    /// Config errors are fatal instead of falling back to defaults.
    fn strict_config(&self) -> bool {
        matches!(self.command, Some(Commands::Generate { strict: true, .. }))
    }
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug,hyper=info,reqwest=info"
    } else {
        "warn,nftnet_sources=info,nftnet=info"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let root = std::path::Path::new(".");
    let config = if cli.strict_config() {
        NftnetConfig::try_load(root)?
    } else {
        NftnetConfig::load(root)
    };

    // CLI flag > config default > Table
    let format = cli.format.unwrap_or_else(|| {
        config
            .default_format()
            .and_then(|f| f.parse().ok())
            .unwrap_or(OutputFormat::Table)
    });

    if let Some(use_color) = config.use_color() {
        colored::control::set_override(use_color);
    }

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            let _ = Cli::command().print_help();
            println!();
            return Ok(());
        }
    };

    match command {
        Commands::Generate {
            limit,
            min_shared_holders,
            output,
            strict: _,
        } => {
            generate::run(
                limit,
                min_shared_holders,
                output.as_deref(),
                &config,
                cli.quiet,
                format,
            )
            .await
        }
        Commands::Summary { file, top } => summary::run(&file, top, format),
        Commands::Details { id } => details::run(&id, &config, format).await,
        Commands::Completions { shell } => completions::run(shell, &mut Cli::command()),
    }
}
