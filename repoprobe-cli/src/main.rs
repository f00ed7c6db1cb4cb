//! Repoprobe CLI - Command line interface for repoprobe
//!
//! Runs end-to-end git lifecycle scenarios against a scratch workspace.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use repoprobe_core::{CliOverrides, Config};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{GenerateArgs, ListArgs, RunArgs};

/// Repoprobe: end-to-end checks of a git client's repository lifecycle
#[derive(Parser, Debug)]
#[command(name = "repoprobe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Root directory for scenario working directories
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// HTTPS clone URL of the remote
    #[arg(long, global = true)]
    remote_url: Option<String>,

    /// SSH address of the remote
    #[arg(long, global = true)]
    ssh_url: Option<String>,

    /// Private key used for SSH transport
    #[arg(long, global = true)]
    identity_file: Option<PathBuf>,

    /// Log every git command at info level
    #[arg(long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Run scenarios (all of them when none are named)
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// List the available scenarios
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Print or write generated content
    Generate(GenerateArgs),

    /// Show current configuration
    Config,
}

impl Cli {
    fn overrides(&self, keep: bool) -> CliOverrides {
        CliOverrides {
            root: self.root.clone(),
            keep,
            https_url: self.remote_url.clone(),
            ssh_url: self.ssh_url.clone(),
            ssh_identity: self.identity_file.clone(),
            trace: self.trace,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    let keep = matches!(&cli.command, Some(Commands::Run(args)) if args.keep);
    let config = Config::load_with_overrides(cli.overrides(keep))?;

    if cli.verbose {
        tracing::info!(
            root = %config.workspace.root.display(),
            https_url = %config.remote.https_url,
            ssh_url = %config.remote.ssh_url,
            trace = config.engine.trace,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("repoprobe {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Run(args)) => {
            args.execute(cli.verbose, &config)?;
        }
        Some(Commands::List(args)) => {
            args.execute();
        }
        Some(Commands::Generate(args)) => {
            args.execute()?;
        }
        Some(Commands::Config) => {
            println!("Repoprobe Configuration");
            println!("=======================");
            println!();
            println!("Workspace:");
            println!("  root: {}", config.workspace.root.display());
            println!("  keep: {}", config.workspace.keep);
            println!();
            println!("Remote:");
            println!("  https_url: {}", config.remote.https_url);
            println!("  ssh_url: {}", config.remote.ssh_url);
            println!("  existing_branch: {}", config.remote.existing_branch);
            println!();
            println!("Engine:");
            println!("  trace: {}", config.engine.trace);
            println!(
                "  ssh_identity: {}",
                config
                    .engine
                    .ssh_identity
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(none)".to_string())
            );
            println!(
                "  https_token: {}",
                if config.engine.https_token.is_some() {
                    "(set)"
                } else {
                    "(none)"
                }
            );
            println!(
                "  author: {} <{}>",
                config.engine.author_name, config.engine.author_email
            );
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
            println!("Repoprobe - End-to-end git lifecycle checks");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
