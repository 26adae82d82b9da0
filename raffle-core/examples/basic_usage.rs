use raffle_core::{draw, MemoryLedger, RaffleSession, Roster};
use std::sync::Arc;

const GUIDES: &str = r#"[
    {"id": 1, "name": "Ana", "supervisor": "Lee", "department": "Support",
     "nps": 72.5, "nrpc": 0.8, "refundPercent": 2.1, "totalTickets": 14},
    {"id": 2, "name": "Ben", "supervisor": "Lee", "department": "Billing",
     "nps": 65.0, "nrpc": 0.6, "refundPercent": 3.4, "totalTickets": 9},
    {"id": 3, "name": "Cleo", "supervisor": "Ray", "department": "Support",
     "nps": 80.2, "nrpc": 0.9, "refundPercent": 1.2, "totalTickets": 21}
]"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let roster = Roster::from_json(GUIDES)?;
    println!("Departments: {:?}", roster.departments());

    let mut session = RaffleSession::new(roster, Arc::new(MemoryLedger::new()));

    let stats = session.stats().await?;
    println!(
        "Pool: {} guides, {} tickets, avg NPS {:.1}",
        stats.available_count, stats.total_tickets, stats.average_nps
    );

    let mut settings = session.settings().clone();
    settings.set_max_winners(2);
    session.update_settings(settings)?;

    let winners = session.run_draw(&mut draw::seeded_rng(7)).await?;
    println!("\nWinners:");
    for (index, winner) in winners.iter().enumerate() {
        println!("  #{} {} ({})", index + 1, winner.name, winner.department);
    }

    println!("\nRemaining pool: {}", session.pool().await?.len());
    Ok(())
}
