use anyhow::Result;
use raffle_core::{draw, RaffleError, RaffleSession, Winner};
use std::time::Duration;

const REVEAL_DELAY: Duration = Duration::from_millis(400);

pub async fn handle_draw(
    session: &mut RaffleSession,
    seed: Option<u64>,
    max_winners: Option<u32>,
) -> Result<()> {
    if let Some(max_winners) = max_winners {
        let mut settings = session.settings().clone();
        settings.set_max_winners(max_winners);
        session.update_settings(settings)?;
    }

    let mut rng = match seed {
        Some(seed) => draw::seeded_rng(seed),
        None => draw::entropy_rng(),
    };

    let pool_size = session.pool().await?.len();
    let drawn = session.start_draw(&mut rng).await?;

    println!(
        "Drawing {} winners from {} guides...",
        drawn.len(),
        pool_size
    );
    for (index, entrant) in drawn.iter().enumerate() {
        tokio::time::sleep(REVEAL_DELAY).await;
        println!("  #{} {}", index + 1, entrant.name);
    }
    session.finish_scrolling()?;

    let winners = match session.commit().await {
        Ok(winners) => winners,
        Err(RaffleError::LedgerWrite(reason)) => retry_until_recorded(session, reason).await?,
        Err(e) => return Err(e.into()),
    };

    print_results(&winners);
    session.dismiss();
    Ok(())
}

/// Offer to save the same winners again until the ledger accepts them.
async fn retry_until_recorded(session: &mut RaffleSession, reason: String) -> Result<Vec<Winner>> {
    let mut reason = reason;
    loop {
        eprintln!("Failed to save winners: {}", reason);

        let retry = super::confirm("Retry saving the same winners?", true)?;

        if !retry {
            if let Some(batch) = session.discard_unrecorded() {
                eprintln!("{} winners were not recorded.", batch.len());
            }
            return Err(RaffleError::LedgerWrite(reason).into());
        }

        match session.retry_commit().await {
            Ok(winners) => return Ok(winners),
            Err(RaffleError::LedgerWrite(next)) => reason = next,
            Err(e) => return Err(e.into()),
        }
    }
}

fn print_results(winners: &[Winner]) {
    println!();
    println!("Latest Draw Results:");
    for (index, winner) in winners.iter().enumerate() {
        println!(
            "  #{} {} - {} (Supervisor: {}, {} tickets)",
            index + 1,
            winner.name,
            winner.department,
            winner.supervisor,
            winner.total_tickets
        );
    }
    println!();
    println!("{} winners recorded.", winners.len());
}
