use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Table};
use raffle_core::{DrawFrom, RaffleSession, RaffleSettings};

pub async fn show_pool(session: &RaffleSession, breakdown: bool) -> Result<()> {
    let stats = session.stats().await?;

    println!("Current Pool:");
    println!("  Available Guides: {}", stats.available_count);
    println!("  Pool Tickets: {}", stats.total_tickets);
    println!("  Pool Avg NPS: {:.1}", stats.average_nps);
    println!();
    print_settings(session.settings());

    if breakdown {
        let pool = session.pool().await?;
        if pool.is_empty() {
            println!();
            println!("No guides available for the raffle with current settings.");
            return Ok(());
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["ID", "Name", "Department", "Supervisor", "NPS", "Tickets"]);

        for entrant in pool {
            table.add_row(vec![
                entrant.id.to_string(),
                entrant.name,
                entrant.department,
                entrant.supervisor,
                format!("{:.1}", entrant.nps),
                entrant.total_tickets.to_string(),
            ]);
        }

        println!();
        println!("{}", table);
    }

    Ok(())
}

pub async fn show_departments(session: &RaffleSession) -> Result<()> {
    let breakdown = session.department_breakdown().await?;
    let selected = session.settings().department_filter();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Department", "Available", "Tickets", "Selected"]);

    for department in session.roster().departments() {
        let summary = breakdown.iter().find(|s| s.department == department);
        let is_selected = selected.map_or(false, |set| set.contains(&department));

        table.add_row(vec![
            department.clone(),
            summary.map_or(0, |s| s.available).to_string(),
            summary.map_or(0, |s| s.tickets).to_string(),
            if is_selected { "yes" } else { "" }.to_string(),
        ]);
    }

    println!("{}", table);
    Ok(())
}

pub fn print_settings(settings: &RaffleSettings) {
    println!("Current Settings:");
    println!("  Max Winners: {}", settings.max_winners);
    match settings.draw_from {
        DrawFrom::All => println!("  Draw From: All"),
        DrawFrom::Departments => {
            println!("  Draw From: Departments");
            if !settings.selected_departments.is_empty() {
                let departments: Vec<&str> = settings
                    .selected_departments
                    .iter()
                    .map(String::as_str)
                    .collect();
                println!("  Departments: {}", departments.join(", "));
            }
        }
    }
    println!(
        "  Selection: {}",
        if settings.weighted {
            "weighted by tickets"
        } else {
            "uniform"
        }
    );
}
