//! Pool derivation and summary statistics.
//!
//! Every function here is pure: the pool is recomputed from the full entrant
//! list, the set of entrant ids already in the ledger, and the settings.

use crate::config::RaffleSettings;
use crate::types::{DepartmentSummary, Entrant, PoolStats, Winner};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Entrant ids that already appear in the ledger.
pub fn won_ids(winners: &[Winner]) -> HashSet<u64> {
    winners.iter().map(|w| w.entrant_id).collect()
}

/// Entrants that have not won yet, in dataset order.
pub fn available_entrants(all: &[Entrant], won_ids: &HashSet<u64>) -> Vec<Entrant> {
    all.iter()
        .filter(|entrant| !won_ids.contains(&entrant.id))
        .cloned()
        .collect()
}

/// The eligible draw pool for `settings`, in dataset order.
pub fn compute_pool(
    all: &[Entrant],
    won_ids: &HashSet<u64>,
    settings: &RaffleSettings,
) -> Vec<Entrant> {
    let filter = settings.department_filter();

    all.iter()
        .filter(|entrant| !won_ids.contains(&entrant.id))
        .filter(|entrant| filter.map_or(true, |depts| depts.contains(&entrant.department)))
        .cloned()
        .collect()
}

pub fn compute_stats(pool: &[Entrant]) -> PoolStats {
    if pool.is_empty() {
        return PoolStats::empty();
    }

    let total_tickets = pool.iter().map(|e| u128::from(e.total_tickets)).sum();
    let nps_sum: f64 = pool.iter().map(|e| e.nps).sum();

    PoolStats {
        available_count: pool.len(),
        total_tickets,
        average_nps: nps_sum / pool.len() as f64,
    }
}

/// Sorted, duplicate-free department names.
pub fn distinct_departments(all: &[Entrant]) -> Vec<String> {
    all.iter()
        .map(|e| e.department.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn department_breakdown(available: &[Entrant]) -> Vec<DepartmentSummary> {
    let mut by_department: BTreeMap<&str, (usize, u128)> = BTreeMap::new();
    for entrant in available {
        let entry = by_department.entry(entrant.department.as_str()).or_default();
        entry.0 += 1;
        entry.1 += u128::from(entrant.total_tickets);
    }

    by_department
        .into_iter()
        .map(|(department, (available, tickets))| DepartmentSummary {
            department: department.to_string(),
            available,
            tickets,
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn entrant(id: u64, department: &str, nps: f64, tickets: u64) -> Entrant {
        Entrant {
            id,
            name: format!("Guide {}", id),
            supervisor: "Sam".to_string(),
            department: department.to_string(),
            nps,
            nrpc: 0.5,
            refund_percent: 1.0,
            total_tickets: tickets,
        }
    }

    fn ids(pool: &[Entrant]) -> Vec<u64> {
        pool.iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_pool_excludes_winners_and_keeps_order() {
        let all: Vec<Entrant> = (1..=5).map(|id| entrant(id, "A", 50.0, 1)).collect();
        let won: HashSet<u64> = [2, 4].into_iter().collect();

        let pool = compute_pool(&all, &won, &RaffleSettings::default());
        assert_eq!(ids(&pool), vec![1, 3, 5]);
    }

    #[test]
    fn test_pool_filters_selected_departments() {
        let all = vec![entrant(1, "X", 10.0, 1), entrant(2, "Y", 20.0, 1)];
        let mut settings = RaffleSettings::default();
        settings.draw_from_departments(["Y"]);

        let pool = compute_pool(&all, &HashSet::new(), &settings);
        assert_eq!(ids(&pool), vec![2]);
    }

    #[test]
    fn test_empty_department_selection_matches_all() {
        let all = vec![
            entrant(1, "X", 10.0, 1),
            entrant(2, "Y", 20.0, 1),
            entrant(3, "Z", 30.0, 1),
        ];
        let won: HashSet<u64> = [3].into_iter().collect();

        let mut departments = RaffleSettings::default();
        departments.draw_from_departments(Vec::<String>::new());

        assert_eq!(
            compute_pool(&all, &won, &departments),
            compute_pool(&all, &won, &RaffleSettings::default())
        );
    }

    #[test]
    fn test_compute_pool_is_idempotent() {
        let all: Vec<Entrant> = (1..=10)
            .map(|id| entrant(id, if id % 2 == 0 { "A" } else { "B" }, 1.0, id))
            .collect();
        let won: HashSet<u64> = [1, 6].into_iter().collect();
        let mut settings = RaffleSettings::default();
        settings.draw_from_departments(["A"]);

        let first = compute_pool(&all, &won, &settings);
        let second = compute_pool(&all, &won, &settings);
        assert_eq!(first, second);
        assert_eq!(ids(&first), vec![2, 4, 8, 10]);
    }

    #[test]
    fn test_stats_on_empty_pool() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.available_count, 0);
        assert_eq!(stats.total_tickets, 0);
        assert_eq!(stats.average_nps, 0.0);
        assert!(!stats.average_nps.is_nan());
    }

    #[test]
    fn test_stats_sums_and_averages() {
        let pool = vec![entrant(1, "A", 40.0, 3), entrant(2, "B", 80.0, 7)];
        let stats = compute_stats(&pool);

        assert_eq!(stats.available_count, 2);
        assert_eq!(stats.total_tickets, 10);
        assert!((stats.average_nps - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_distinct_departments_sorted() {
        let all = vec![
            entrant(1, "B", 0.0, 0),
            entrant(2, "A", 0.0, 0),
            entrant(3, "A", 0.0, 0),
        ];
        assert_eq!(distinct_departments(&all), vec!["A", "B"]);
    }

    #[test]
    fn test_department_breakdown() {
        let available = vec![
            entrant(1, "Support", 0.0, 4),
            entrant(2, "Sales", 0.0, 1),
            entrant(3, "Support", 0.0, 6),
        ];
        let breakdown = department_breakdown(&available);

        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].department, "Sales");
        assert_eq!(breakdown[0].available, 1);
        assert_eq!(breakdown[1].department, "Support");
        assert_eq!(breakdown[1].available, 2);
        assert_eq!(breakdown[1].tickets, 10);
    }

    #[test]
    fn test_ticket_totals_past_u64() {
        let pool = vec![
            entrant(1, "Support", 0.0, u64::MAX),
            entrant(2, "Support", 0.0, 1),
        ];

        let stats = compute_stats(&pool);
        assert_eq!(stats.total_tickets, u128::from(u64::MAX) + 1);

        let breakdown = department_breakdown(&pool);
        assert_eq!(breakdown[0].tickets, u128::from(u64::MAX) + 1);
    }
}
