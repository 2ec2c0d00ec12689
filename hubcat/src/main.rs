use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod catalog;
mod commands;
mod context;
mod readme;
mod version;

use commands::consolidate::{ConsolidateOptions, DEFAULT_ASSET_BASE_URL};

/// Hubcat - Extension catalog builder
///
/// Builds a catalog of container image labels from Docker Hub repositories.
#[derive(Parser, Debug)]
#[command(name = "hubcat")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// YAML configuration file
    #[arg(short, long, global = true, env = "HUBCAT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Display version information
    Version,
    /// Build the catalog from repository files and image labels
    Consolidate {
        /// Directory holding repository description files
        #[arg(long, default_value = "repos")]
        repos: PathBuf,
        /// Path the catalog is written to
        #[arg(short, long, default_value = "manifest.json")]
        output: PathBuf,
        /// Base URL logo paths are appended to
        #[arg(long, default_value = DEFAULT_ASSET_BASE_URL)]
        asset_base_url: String,
        /// Log and skip tags that fail instead of aborting
        #[arg(long)]
        skip_failed_tags: bool,
    },
    /// List the tags of a repository, most recently updated first
    Tags {
        /// Repository path (e.g. bluerobotics/cockpit)
        repository: String,
    },
    /// Show the labels of an image for this machine
    Labels {
        /// Image reference (repository[:tag])
        reference: String,
    },
    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Version => version::print_version(),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
        }
        Commands::Consolidate {
            repos,
            output,
            asset_base_url,
            skip_failed_tags,
        } => {
            let ctx = context::AppContext::build(cli.config.as_deref())?;
            let options = ConsolidateOptions {
                repos_dir: repos,
                output,
                asset_base_url,
                skip_failed_tags,
            };
            commands::consolidate::handle_consolidate(&ctx, options).await?;
        }
        Commands::Tags { repository } => {
            let ctx = context::AppContext::build(cli.config.as_deref())?;
            commands::inspect::handle_tags(&ctx, &repository).await?;
        }
        Commands::Labels { reference } => {
            let ctx = context::AppContext::build(cli.config.as_deref())?;
            commands::inspect::handle_labels(&ctx, &reference).await?;
        }
    }

    Ok(())
}

/// Logs go to stderr so command output stays machine readable.
/// `RUST_LOG` takes precedence over `-v`.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("info"),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
