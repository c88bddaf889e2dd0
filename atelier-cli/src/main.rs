//! Atelier CLI - Command line interface for Atelier
//!
//! Multi-agent collaboration that turns a request into an approved,
//! published web page.

mod commands;

use clap::{Parser, Subcommand};
use atelier_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::BuildArgs;

/// Atelier: role-specialized agents that build and publish a web page
#[derive(Parser, Debug)]
#[command(name = "atelier")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Backend endpoint base URL (overrides config and env)
    #[arg(long, global = true, env = "ATELIER_ENDPOINT")]
    endpoint: Option<String>,

    /// Model or deployment name (overrides config and env)
    #[arg(long, global = true, env = "ATELIER_MODEL")]
    model: Option<String>,

    /// Maximum agent turns per collaboration (overrides config and env)
    #[arg(long, global = true, env = "ATELIER_MAX_TURNS")]
    max_turns: Option<u32>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Collaborate on a web page and publish it after approval
    #[command(visible_alias = "b")]
    Build(BuildArgs),

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    // Load configuration with overrides
    let config = Config::load_with_overrides(
        cli.endpoint.clone(),
        cli.model.clone(),
        cli.max_turns,
    )?;

    if cli.verbose {
        tracing::info!(
            backend = %config.backend.kind,
            endpoint = %config.backend.endpoint,
            model = %config.backend.model,
            max_turns = config.orchestration.max_turns,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("atelier {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Build(args)) => {
            args.execute(cli.verbose, &config).await?;
        }
        Some(Commands::Config) => {
            println!("Atelier Configuration");
            println!("=====================");
            println!();
            println!("Backend Settings:");
            println!("  kind: {}", config.backend.kind);
            println!("  endpoint: {}", config.backend.endpoint);
            println!("  model: {}", config.backend.model);
            println!();
            println!("Orchestration Settings:");
            println!("  max_turns: {}", config.orchestration.max_turns);
            println!();
            println!("Publish Settings:");
            println!("  repo_path: {}", config.publish.repo_path.display());
            println!("  artifact_file: {}", config.publish.artifact_file);
            println!("  remote: {}", config.publish.remote);
            println!("  branch: {}", config.publish.branch);
            println!();
            if let Some(path) = Config::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
        }
        None => {
            println!("Atelier - Multi-agent collaboration for web pages");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
