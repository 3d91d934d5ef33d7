/// Selecta - budgeted media selection curator
use clap::{Parser, Subcommand};
use selecta_cli::{commands, CliConfig, StdinConfirm};
use selecta_curator::{AlwaysConfirm, ConfirmGate, NeverConfirm};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "selecta")]
#[command(about = "Keep a media selection under a byte budget", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path (defaults to selecta.toml, then config.json)
    #[arg(short, long, global = true, env = "SELECTA_CONFIG_FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile, rotate and (optionally) re-sequence the selection
    Run {
        /// Re-sequence an unchanged selection without asking
        #[arg(short, long, conflicts_with = "no_prompt")]
        yes: bool,
        /// Never re-sequence an unchanged selection
        #[arg(long)]
        no_prompt: bool,
        /// Seed for reproducible tie-breaks
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show the reconciled selection without changing anything
    Status,
    /// Regenerate the manifest from the selection directory
    Rebuild,
    /// Re-sequence the selection now
    Shuffle {
        /// Seed for reproducible ordering
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Remove a stale run lock
    Unlock,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "selecta=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            yes,
            no_prompt,
            seed,
        } => {
            let gate: &dyn ConfirmGate = if yes {
                &AlwaysConfirm
            } else if no_prompt {
                &NeverConfirm
            } else {
                &StdinConfirm
            };
            let summary = commands::run(&config, gate, seed)?;
            if !summary.budget_satisfied {
                tracing::warn!("Selection is still over budget");
            }
        }
        Commands::Status => {
            print!("{}", commands::status(&config)?);
        }
        Commands::Rebuild => {
            let manifest = commands::rebuild(&config)?;
            println!(
                "Manifest rebuilt: {} items, {}",
                manifest.count(),
                selecta_core::format_bytes(manifest.total_bytes())
            );
        }
        Commands::Shuffle { seed } => {
            commands::shuffle(&config, seed)?;
        }
        Commands::Unlock => {
            if commands::unlock(&config)? {
                println!("Lock removed");
            } else {
                println!("No lock present");
            }
        }
    }

    Ok(())
}
