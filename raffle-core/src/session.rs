use crate::config::RaffleSettings;
use crate::draw;
use crate::error::{RaffleError, Result};
use crate::ledger::WinnerLedger;
use crate::pool;
use crate::roster::Roster;
use crate::types::{DepartmentSummary, Entrant, PoolStats, Winner};
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Where the raffle is in its draw cycle.
///
/// `Drawing` covers the scrolling reveal, `Revealing` the winner animation.
/// Nothing is persisted until `Revealing` is committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RafflePhase {
    Idle,
    Configuring,
    Drawing { winners: Vec<Entrant> },
    Revealing { winners: Vec<Entrant> },
    Celebrating { winners: Vec<Winner> },
}

impl RafflePhase {
    pub fn is_drawing(&self) -> bool {
        matches!(self, Self::Drawing { .. } | Self::Revealing { .. })
    }
}

pub struct RaffleSession {
    roster: Roster,
    ledger: Arc<dyn WinnerLedger>,
    settings: RaffleSettings,
    phase: RafflePhase,
    unrecorded: Option<Vec<Winner>>,
    last_results: Vec<Winner>,
}

impl RaffleSession {
    pub fn new(roster: Roster, ledger: Arc<dyn WinnerLedger>) -> Self {
        Self::with_settings(roster, ledger, RaffleSettings::default())
    }

    pub fn with_settings(
        roster: Roster,
        ledger: Arc<dyn WinnerLedger>,
        settings: RaffleSettings,
    ) -> Self {
        Self {
            roster,
            ledger,
            settings,
            phase: RafflePhase::Idle,
            unrecorded: None,
            last_results: Vec::new(),
        }
    }

    pub fn phase(&self) -> &RafflePhase {
        &self.phase
    }

    pub fn settings(&self) -> &RaffleSettings {
        &self.settings
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Winners of the last successfully recorded draw.
    pub fn last_results(&self) -> &[Winner] {
        &self.last_results
    }

    /// A drawn batch whose ledger write failed and is waiting for a retry.
    pub fn unrecorded(&self) -> Option<&[Winner]> {
        self.unrecorded.as_deref()
    }

    pub fn open_settings(&mut self) -> Result<()> {
        self.ensure_not_drawing()?;
        self.phase = RafflePhase::Configuring;
        Ok(())
    }

    pub fn update_settings(&mut self, mut settings: RaffleSettings) -> Result<()> {
        self.ensure_not_drawing()?;
        settings.normalize();
        settings.validate()?;

        tracing::debug!("Raffle settings updated: {:?}", settings);
        self.settings = settings;
        Ok(())
    }

    pub fn close_settings(&mut self) {
        if matches!(self.phase, RafflePhase::Configuring) {
            self.phase = RafflePhase::Idle;
        }
    }

    pub async fn winners(&self) -> Result<Vec<Winner>> {
        self.ledger.list().await
    }

    /// Entrants that have not won yet, ignoring the department filter.
    pub async fn available(&self) -> Result<Vec<Entrant>> {
        let winners = self.ledger.list().await?;
        Ok(pool::available_entrants(
            self.roster.entrants(),
            &pool::won_ids(&winners),
        ))
    }

    pub async fn pool(&self) -> Result<Vec<Entrant>> {
        let winners = self.ledger.list().await?;
        Ok(pool::compute_pool(
            self.roster.entrants(),
            &pool::won_ids(&winners),
            &self.settings,
        ))
    }

    pub async fn stats(&self) -> Result<PoolStats> {
        Ok(pool::compute_stats(&self.pool().await?))
    }

    pub async fn department_breakdown(&self) -> Result<Vec<DepartmentSummary>> {
        Ok(pool::department_breakdown(&self.available().await?))
    }

    /// Pick winners for the current settings and enter the `Drawing` phase.
    ///
    /// Refused while another draw is in flight or a failed batch is waiting
    /// to be recorded. Nothing changes on refusal.
    pub async fn start_draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Vec<Entrant>> {
        self.ensure_not_drawing()?;
        if let Some(batch) = &self.unrecorded {
            return Err(RaffleError::UnrecordedWinners { count: batch.len() });
        }

        let pool = self.pool().await?;
        if pool.is_empty() {
            return Err(RaffleError::EmptyPool);
        }

        let count = (self.settings.max_winners as usize).min(pool.len());
        let winners = draw::draw(&pool, count, self.settings.draw_mode(), rng)?;

        tracing::info!(
            "Drawing {} winners from a pool of {}",
            winners.len(),
            pool.len()
        );
        self.phase = RafflePhase::Drawing {
            winners: winners.clone(),
        };
        Ok(winners)
    }

    /// The scrolling reveal has finished; show the winners.
    pub fn finish_scrolling(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.phase, RafflePhase::Idle) {
            RafflePhase::Drawing { winners } => {
                self.phase = RafflePhase::Revealing { winners };
                Ok(())
            }
            other => {
                self.phase = other;
                Err(RaffleError::invalid_state("Not in drawing phase"))
            }
        }
    }

    /// Record the revealed winners in the ledger as one batch.
    ///
    /// On failure the batch is kept for [`retry_commit`](Self::retry_commit)
    /// and the session returns to `Idle`.
    pub async fn commit(&mut self) -> Result<Vec<Winner>> {
        let entrants = match &self.phase {
            RafflePhase::Revealing { winners } => winners.clone(),
            _ => return Err(RaffleError::invalid_state("Not in revealing phase")),
        };

        let won_at = Utc::now();
        let batch: Vec<Winner> = entrants
            .iter()
            .map(|entrant| Winner::from_entrant(entrant, won_at))
            .collect();

        self.record(batch).await
    }

    /// Append the batch from a failed commit again, unchanged.
    pub async fn retry_commit(&mut self) -> Result<Vec<Winner>> {
        self.ensure_not_drawing()?;
        let batch = self
            .unrecorded
            .take()
            .ok_or_else(|| RaffleError::invalid_state("No unrecorded winners to retry"))?;

        self.record(batch).await
    }

    /// Give up on a batch whose ledger write failed.
    pub fn discard_unrecorded(&mut self) -> Option<Vec<Winner>> {
        let discarded = self.unrecorded.take();
        if let Some(batch) = &discarded {
            tracing::warn!("Discarded {} unrecorded winners", batch.len());
        }
        discarded
    }

    async fn record(&mut self, batch: Vec<Winner>) -> Result<Vec<Winner>> {
        match self.ledger.append(&batch).await {
            Ok(()) => {
                tracing::info!("Committed {} winners", batch.len());
                self.unrecorded = None;
                self.last_results = batch.clone();
                self.phase = RafflePhase::Celebrating {
                    winners: batch.clone(),
                };
                Ok(batch)
            }
            Err(e) => {
                tracing::warn!("Failed to commit {} winners: {}", batch.len(), e);
                self.unrecorded = Some(batch);
                self.phase = RafflePhase::Idle;
                Err(RaffleError::LedgerWrite(e.to_string()))
            }
        }
    }

    /// Abort the reveal before anything is recorded.
    pub fn interrupt(&mut self) -> bool {
        if self.phase.is_drawing() {
            tracing::info!("Draw interrupted before commit");
            self.phase = RafflePhase::Idle;
            true
        } else {
            false
        }
    }

    pub fn dismiss(&mut self) {
        if matches!(self.phase, RafflePhase::Celebrating { .. }) {
            self.phase = RafflePhase::Idle;
        }
    }

    /// Draw, reveal and commit in one go.
    pub async fn run_draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Vec<Winner>> {
        self.start_draw(rng).await?;
        self.finish_scrolling()?;
        self.commit().await
    }

    /// Remove every winner from the ledger. Returns how many were removed.
    ///
    /// Confirmation is the caller's job.
    pub async fn purge(&mut self) -> Result<usize> {
        self.ensure_not_drawing()?;

        let count = self.ledger.list().await?.len();
        if count == 0 {
            return Ok(0);
        }

        self.ledger
            .clear()
            .await
            .map_err(|e| RaffleError::LedgerPurge(e.to_string()))?;

        self.last_results.clear();
        tracing::info!("Purged {} winners", count);
        Ok(count)
    }

    fn ensure_not_drawing(&self) -> Result<()> {
        if self.phase.is_drawing() {
            return Err(RaffleError::DrawInProgress);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DrawFrom;
    use crate::draw::seeded_rng;
    use crate::ledger::MemoryLedger;
    use crate::pool::tests::entrant;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Memory ledger whose writes can be made to fail.
    #[derive(Default)]
    struct FlakyLedger {
        inner: MemoryLedger,
        fail_append: AtomicBool,
        fail_clear: AtomicBool,
    }

    #[async_trait]
    impl WinnerLedger for FlakyLedger {
        async fn list(&self) -> Result<Vec<Winner>> {
            self.inner.list().await
        }

        async fn append(&self, winners: &[Winner]) -> Result<()> {
            if self.fail_append.load(Ordering::SeqCst) {
                return Err(RaffleError::internal("ledger offline"));
            }
            self.inner.append(winners).await
        }

        async fn clear(&self) -> Result<()> {
            if self.fail_clear.load(Ordering::SeqCst) {
                return Err(RaffleError::internal("ledger offline"));
            }
            self.inner.clear().await
        }
    }

    fn roster_of(n: u64) -> Roster {
        Roster::new((1..=n).map(|id| entrant(id, "A", 50.0, 1)).collect()).unwrap()
    }

    fn settings_with_max(max_winners: u32) -> RaffleSettings {
        let mut settings = RaffleSettings::default();
        settings.set_max_winners(max_winners);
        settings
    }

    #[tokio::test]
    async fn test_draw_commit_shrinks_pool() {
        let ledger = Arc::new(MemoryLedger::new());
        let mut session =
            RaffleSession::with_settings(roster_of(10), ledger.clone(), settings_with_max(3));

        let winners = session.run_draw(&mut seeded_rng(1)).await.unwrap();
        assert_eq!(winners.len(), 3);
        let unique: HashSet<u64> = winners.iter().map(|w| w.entrant_id).collect();
        assert_eq!(unique.len(), 3);
        assert!(matches!(session.phase(), RafflePhase::Celebrating { .. }));

        assert_eq!(ledger.len(), 3);
        let pool = session.pool().await.unwrap();
        assert_eq!(pool.len(), 7);
        assert!(pool.iter().all(|e| !unique.contains(&e.id)));
        assert_eq!(session.stats().await.unwrap().available_count, 7);
    }

    #[tokio::test]
    async fn test_department_draw_clamps_to_pool() {
        let roster =
            Roster::new(vec![entrant(1, "X", 10.0, 1), entrant(2, "Y", 20.0, 1)]).unwrap();
        let mut settings = settings_with_max(5);
        settings.draw_from_departments(["Y"]);
        let mut session =
            RaffleSession::with_settings(roster, Arc::new(MemoryLedger::new()), settings);

        let drawn = session.start_draw(&mut seeded_rng(7)).await.unwrap();
        assert_eq!(drawn.len(), 1);
        assert_eq!(drawn[0].id, 2);
    }

    #[tokio::test]
    async fn test_repeated_draws_never_repeat_winners() {
        let ledger = Arc::new(MemoryLedger::new());
        let mut session =
            RaffleSession::with_settings(roster_of(10), ledger.clone(), settings_with_max(3));

        let mut seen = HashSet::new();
        for (round, expected) in [3usize, 3, 3, 1].into_iter().enumerate() {
            let winners = session
                .run_draw(&mut seeded_rng(round as u64))
                .await
                .unwrap();
            assert_eq!(winners.len(), expected);
            for winner in winners {
                assert!(seen.insert(winner.entrant_id));
            }
            session.dismiss();
        }

        assert_eq!(seen.len(), 10);
        let result = session.start_draw(&mut seeded_rng(99)).await;
        assert!(matches!(result, Err(RaffleError::EmptyPool)));
        assert!(matches!(session.phase(), RafflePhase::Idle));
    }

    #[tokio::test]
    async fn test_second_draw_rejected_while_drawing() {
        let mut session = RaffleSession::new(roster_of(10), Arc::new(MemoryLedger::new()));

        let first = session.start_draw(&mut seeded_rng(1)).await.unwrap();
        let second = session.start_draw(&mut seeded_rng(2)).await;
        assert!(matches!(second, Err(RaffleError::DrawInProgress)));

        match session.phase() {
            RafflePhase::Drawing { winners } => assert_eq!(winners, &first),
            other => panic!("unexpected phase {:?}", other),
        }

        session.finish_scrolling().unwrap();
        assert!(matches!(
            session.start_draw(&mut seeded_rng(3)).await,
            Err(RaffleError::DrawInProgress)
        ));
        assert!(matches!(session.purge().await, Err(RaffleError::DrawInProgress)));
    }

    #[tokio::test]
    async fn test_interrupt_before_commit_records_nothing() {
        let ledger = Arc::new(MemoryLedger::new());
        let mut session = RaffleSession::new(roster_of(5), ledger.clone());

        session.start_draw(&mut seeded_rng(1)).await.unwrap();
        session.finish_scrolling().unwrap();
        assert!(session.interrupt());

        assert!(matches!(session.phase(), RafflePhase::Idle));
        assert!(ledger.is_empty());
        assert_eq!(session.pool().await.unwrap().len(), 5);
        assert!(!session.interrupt());
    }

    #[tokio::test]
    async fn test_failed_commit_keeps_batch_for_retry() {
        let ledger = Arc::new(FlakyLedger::default());
        ledger.fail_append.store(true, Ordering::SeqCst);
        let mut session =
            RaffleSession::with_settings(roster_of(10), ledger.clone(), settings_with_max(4));

        let result = session.run_draw(&mut seeded_rng(5)).await;
        assert!(matches!(result, Err(RaffleError::LedgerWrite(_))));
        assert!(matches!(session.phase(), RafflePhase::Idle));
        assert!(session.last_results().is_empty());
        assert_eq!(session.pool().await.unwrap().len(), 10);

        let pending: Vec<String> = session
            .unrecorded()
            .unwrap()
            .iter()
            .map(|w| w.id.clone())
            .collect();
        assert_eq!(pending.len(), 4);

        // no re-roll while the batch is pending
        assert!(matches!(
            session.start_draw(&mut seeded_rng(6)).await,
            Err(RaffleError::UnrecordedWinners { count: 4 })
        ));

        ledger.fail_append.store(false, Ordering::SeqCst);
        let recorded = session.retry_commit().await.unwrap();
        let recorded_ids: Vec<String> = recorded.iter().map(|w| w.id.clone()).collect();
        assert_eq!(recorded_ids, pending);
        assert!(session.unrecorded().is_none());
        assert_eq!(ledger.list().await.unwrap().len(), 4);
        assert_eq!(session.last_results().len(), 4);
    }

    #[tokio::test]
    async fn test_discard_unrecorded_allows_new_draw() {
        let ledger = Arc::new(FlakyLedger::default());
        ledger.fail_append.store(true, Ordering::SeqCst);
        let mut session = RaffleSession::new(roster_of(3), ledger.clone());

        assert!(session.run_draw(&mut seeded_rng(1)).await.is_err());
        assert_eq!(session.discard_unrecorded().map(|b| b.len()), Some(3));

        ledger.fail_append.store(false, Ordering::SeqCst);
        assert_eq!(session.run_draw(&mut seeded_rng(2)).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_purge() {
        let ledger = Arc::new(FlakyLedger::default());
        let mut session =
            RaffleSession::with_settings(roster_of(6), ledger.clone(), settings_with_max(2));
        session.run_draw(&mut seeded_rng(1)).await.unwrap();
        session.dismiss();

        ledger.fail_clear.store(true, Ordering::SeqCst);
        let before = ledger.list().await.unwrap();
        assert!(matches!(
            session.purge().await,
            Err(RaffleError::LedgerPurge(_))
        ));
        assert_eq!(ledger.list().await.unwrap(), before);

        ledger.fail_clear.store(false, Ordering::SeqCst);
        assert_eq!(session.purge().await.unwrap(), 2);
        assert!(ledger.list().await.unwrap().is_empty());
        assert!(session.last_results().is_empty());
        assert_eq!(session.pool().await.unwrap().len(), 6);

        assert_eq!(session.purge().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_settings_phase_transitions() {
        let mut session = RaffleSession::new(roster_of(4), Arc::new(MemoryLedger::new()));

        session.open_settings().unwrap();
        assert!(matches!(session.phase(), RafflePhase::Configuring));

        let mut settings = session.settings().clone();
        settings.set_max_winners(2);
        settings.weighted = true;
        session.update_settings(settings).unwrap();

        // drawing straight from the settings dialog
        let drawn = session.start_draw(&mut seeded_rng(4)).await.unwrap();
        assert_eq!(drawn.len(), 2);
        assert!(session.open_settings().is_err());
        assert!(session.finish_scrolling().is_ok());
        assert!(session.finish_scrolling().is_err());
        assert!(matches!(session.phase(), RafflePhase::Revealing { .. }));
    }

    #[tokio::test]
    async fn test_update_settings_rejects_invalid() {
        let mut session = RaffleSession::new(roster_of(4), Arc::new(MemoryLedger::new()));
        let settings = RaffleSettings {
            max_winners: 0,
            ..RaffleSettings::default()
        };

        assert!(matches!(
            session.update_settings(settings),
            Err(RaffleError::Config(_))
        ));
        assert_eq!(session.settings().max_winners, 5);
    }

    #[tokio::test]
    async fn test_update_settings_normalizes_selection() {
        let mut session = RaffleSession::new(roster_of(4), Arc::new(MemoryLedger::new()));
        let settings = RaffleSettings {
            selected_departments: ["Sales".to_string()].into_iter().collect(),
            ..RaffleSettings::default()
        };

        session.update_settings(settings).unwrap();
        assert_eq!(session.settings().draw_from, DrawFrom::All);
        assert!(session.settings().selected_departments.is_empty());
        assert_eq!(session.pool().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_commit_requires_revealing_phase() {
        let mut session = RaffleSession::new(roster_of(4), Arc::new(MemoryLedger::new()));
        assert!(matches!(
            session.commit().await,
            Err(RaffleError::InvalidState(_))
        ));
        assert!(matches!(
            session.retry_commit().await,
            Err(RaffleError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn test_weighted_draw_overflow_leaves_session_idle() {
        let roster = Roster::new(vec![
            entrant(1, "A", 0.0, u64::MAX),
            entrant(2, "A", 0.0, 1),
        ])
        .unwrap();
        let mut settings = settings_with_max(2);
        settings.weighted = true;
        let mut session = RaffleSession::with_settings(roster, Arc::new(MemoryLedger::new()), settings);

        assert!(matches!(
            session.start_draw(&mut seeded_rng(1)).await,
            Err(RaffleError::TicketOverflow)
        ));
        assert!(matches!(session.phase(), RafflePhase::Idle));

        let stats = session.stats().await.unwrap();
        assert_eq!(stats.total_tickets, u128::from(u64::MAX) + 1);
    }
}
