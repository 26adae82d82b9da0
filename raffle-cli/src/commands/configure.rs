use super::pool::print_settings;
use crate::config::CliConfig;
use anyhow::{bail, Result};
use clap::Args;
use raffle_core::{RaffleSession, MAX_WINNERS};

#[derive(Args)]
pub struct ConfigureArgs {
    /// Number of winners per draw (1-28)
    #[arg(short, long)]
    max_winners: Option<u32>,

    /// Draw from every department
    #[arg(long, conflicts_with = "departments")]
    all: bool,

    /// Draw only from these departments (comma separated)
    #[arg(long, value_delimiter = ',')]
    departments: Option<Vec<String>>,

    /// Add or remove a department from the selection
    #[arg(long, conflicts_with = "all")]
    toggle: Vec<String>,

    /// Weight selection by ticket count
    #[arg(long, conflicts_with = "uniform")]
    weighted: bool,

    /// Give every guide the same chance
    #[arg(long)]
    uniform: bool,
}

pub async fn handle_configure(
    args: ConfigureArgs,
    session: &mut RaffleSession,
    config: &CliConfig,
) -> Result<()> {
    let known = session.roster().departments();
    let mut settings = session.settings().clone();

    session.open_settings()?;

    if let Some(max_winners) = args.max_winners {
        if max_winners > MAX_WINNERS {
            println!("Max winners is {}, using {}", MAX_WINNERS, MAX_WINNERS);
        }
        settings.set_max_winners(max_winners);
    }

    if args.all {
        settings.draw_from_all();
    }

    if let Some(departments) = args.departments {
        for department in &departments {
            if !known.contains(department) {
                bail!(
                    "Unknown department '{}'. Use 'raffle departments' to see them",
                    department
                );
            }
        }
        settings.draw_from_departments(departments);
    }

    if !args.toggle.is_empty() {
        let selection = settings.selected_departments.clone();
        settings.draw_from_departments(selection);
        for department in &args.toggle {
            if !known.contains(department) {
                bail!("Unknown department '{}'", department);
            }
            settings.toggle_department(department);
        }
    }

    if args.weighted {
        settings.weighted = true;
    } else if args.uniform {
        settings.weighted = false;
    }

    session.update_settings(settings.clone())?;
    session.close_settings();
    config.save_settings(&settings).await?;

    print_settings(&settings);

    let stats = session.stats().await?;
    println!();
    println!(
        "Pool: {} guides, {} tickets",
        stats.available_count, stats.total_tickets
    );
    if stats.available_count == 0 {
        println!("No guides available for the raffle with current settings.");
    }

    Ok(())
}
