mod commands;
mod config;

use clap::{Parser, Subcommand};
use config::CliConfig;
use raffle_core::{open_ledger, RaffleError, RaffleSession, Roster};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "raffle")]
#[command(about = "Contest raffle - draw winners from the guide roster")]
#[command(version)]
struct Cli {
    /// Data directory for the winner ledger and settings
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Entrant dataset (JSON), defaults to <data-dir>/guides.json
    #[arg(short, long, global = true)]
    entrants: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current draw pool
    Pool {
        /// Also list available guides per department
        #[arg(short, long)]
        breakdown: bool,
    },
    /// List departments with their available guides
    Departments,
    /// Change raffle settings
    Configure(commands::ConfigureArgs),
    /// Run a draw and record the winners
    Draw {
        /// Seed for a reproducible draw
        #[arg(long)]
        seed: Option<u64>,
        /// Override the number of winners for this draw only
        #[arg(short, long)]
        max_winners: Option<u32>,
    },
    /// Winner ledger commands
    #[command(subcommand)]
    Winners(commands::WinnersCommands),
    /// Delete every recorded winner
    Purge {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "raffle={},raffle_core={}",
            log_level, log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CliConfig::new(cli.data_dir, cli.entrants);

    // Ensure data directory exists
    tokio::fs::create_dir_all(&config.data_dir).await?;

    let result = run(cli.command, &config).await;

    if let Err(e) = result {
        match e.downcast_ref::<RaffleError>() {
            Some(RaffleError::EmptyPool) => {
                eprintln!("Error: No guides available for the raffle with current settings.");
                eprintln!("Use 'raffle configure' to change the departments or 'raffle purge' to reset winners");
            }
            Some(RaffleError::DrawInProgress) => {
                eprintln!("Error: A draw is already in progress");
            }
            Some(RaffleError::LedgerWrite(reason)) => {
                eprintln!("Error: Failed to save winners: {}", reason);
                eprintln!("Please try again.");
            }
            Some(RaffleError::LedgerPurge(reason)) => {
                eprintln!("Error: Failed to purge winners: {}", reason);
            }
            _ => {
                eprintln!("Error: {:#}", e);
            }
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run(command: Commands, config: &CliConfig) -> anyhow::Result<()> {
    let roster = Roster::load(&config.entrants_path).await?;
    let ledger = Arc::new(open_ledger(&config.data_dir).await?);
    let settings = config.load_settings().await?;
    let mut session = RaffleSession::with_settings(roster, ledger, settings);

    match command {
        Commands::Pool { breakdown } => commands::show_pool(&session, breakdown).await,
        Commands::Departments => commands::show_departments(&session).await,
        Commands::Configure(args) => commands::handle_configure(args, &mut session, config).await,
        Commands::Draw { seed, max_winners } => {
            commands::handle_draw(&mut session, seed, max_winners).await
        }
        Commands::Winners(cmd) => commands::handle_winners_command(cmd, &session).await,
        Commands::Purge { force } => commands::handle_purge(&mut session, force).await,
    }
}
