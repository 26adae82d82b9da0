use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{presets::UTF8_FULL, Table};
use raffle_core::RaffleSession;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum WinnersCommands {
    /// List recorded winners
    List,
    /// Export recorded winners as JSON
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },
}

pub async fn handle_winners_command(cmd: WinnersCommands, session: &RaffleSession) -> Result<()> {
    match cmd {
        WinnersCommands::List => {
            let winners = session.winners().await?;

            if winners.is_empty() {
                println!("No winners recorded yet.");
                println!("Run a draw with: raffle draw");
                return Ok(());
            }

            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec![
                "#",
                "Name",
                "Department",
                "Supervisor",
                "Tickets",
                "Won At",
            ]);

            for (index, winner) in winners.iter().enumerate() {
                table.add_row(vec![
                    (index + 1).to_string(),
                    winner.name.clone(),
                    winner.department.clone(),
                    winner.supervisor.clone(),
                    winner.total_tickets.to_string(),
                    winner.won_at.format("%Y-%m-%d %H:%M").to_string(),
                ]);
            }

            println!("{}", table);
        }

        WinnersCommands::Export { output } => {
            let winners = session.winners().await?;
            let content = serde_json::to_string_pretty(&winners)?;

            tokio::fs::write(&output, content)
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;

            println!("Exported {} winners to {}", winners.len(), output.display());
        }
    }

    Ok(())
}

pub async fn handle_purge(session: &mut RaffleSession, force: bool) -> Result<()> {
    let count = session.winners().await?.len();
    if count == 0 {
        println!("No winners to purge!");
        return Ok(());
    }

    if !force {
        let confirmed = super::confirm(
            format!(
                "Are you sure you want to delete ALL {} winners? This action cannot be undone.",
                count
            ),
            false,
        )?;

        if !confirmed {
            println!("Purge cancelled.");
            return Ok(());
        }
    }

    let removed = session.purge().await?;
    println!("All {} winners have been successfully purged!", removed);
    Ok(())
}
