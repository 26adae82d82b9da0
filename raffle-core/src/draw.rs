//! Draw engine: picks winners from a pool without replacement.

use crate::config::DrawMode;
use crate::error::{RaffleError, Result};
use crate::types::Entrant;
use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Reproducible generator for a given seed.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

pub fn entropy_rng() -> ChaCha8Rng {
    ChaCha8Rng::from_entropy()
}

/// Select up to `count` distinct entrants from `pool`, in reveal order.
///
/// The result always has `min(count, pool.len())` entries. The pool itself is
/// left untouched.
pub fn draw<R: Rng + ?Sized>(
    pool: &[Entrant],
    count: usize,
    mode: DrawMode,
    rng: &mut R,
) -> Result<Vec<Entrant>> {
    if pool.is_empty() {
        return Err(RaffleError::EmptyPool);
    }
    if count == 0 {
        return Err(RaffleError::InvalidCount(count));
    }

    let count = count.min(pool.len());
    let winners = match mode {
        DrawMode::Uniform => draw_uniform(pool, count, rng),
        DrawMode::Weighted => draw_weighted(pool, count, rng)?,
    };

    tracing::debug!(
        "Drew {} of {} entrants ({:?})",
        winners.len(),
        pool.len(),
        mode
    );
    Ok(winners)
}

fn draw_uniform<R: Rng + ?Sized>(pool: &[Entrant], count: usize, rng: &mut R) -> Vec<Entrant> {
    // index::sample returns the picked indexes already shuffled
    index::sample(rng, pool.len(), count)
        .into_iter()
        .map(|i| pool[i].clone())
        .collect()
}

/// Sequential weighted picks, removing each winner before the next pick.
fn draw_weighted<R: Rng + ?Sized>(
    pool: &[Entrant],
    count: usize,
    rng: &mut R,
) -> Result<Vec<Entrant>> {
    // WeightedIndex sums the weights in u64; every later pick is over a subset
    pool.iter()
        .try_fold(0u64, |total, e| total.checked_add(e.total_tickets))
        .ok_or(RaffleError::TicketOverflow)?;

    let mut remaining: Vec<&Entrant> = pool.iter().collect();
    let mut winners = Vec::with_capacity(count);

    while winners.len() < count {
        let picked = match WeightedIndex::new(remaining.iter().map(|e| e.total_tickets)) {
            Ok(dist) => dist.sample(rng),
            // only zero-ticket entrants left
            Err(WeightedError::AllWeightsZero) => rng.gen_range(0..remaining.len()),
            Err(e) => {
                return Err(RaffleError::internal(format!(
                    "Invalid ticket weights: {}",
                    e
                )))
            }
        };
        winners.push(remaining.remove(picked).clone());
    }

    Ok(winners)
}
