use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A guide eligible to be drawn. Loaded once from the static dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entrant {
    pub id: u64,
    pub name: String,
    pub supervisor: String,
    pub department: String,
    pub nps: f64,
    pub nrpc: f64,
    pub refund_percent: f64,
    pub total_tickets: u64,
}

/// Persisted snapshot of an entrant at the moment of winning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Winner {
    pub id: String,
    #[serde(rename = "guide_id")]
    pub entrant_id: u64,
    pub name: String,
    pub supervisor: String,
    pub department: String,
    pub nps: f64,
    pub nrpc: f64,
    pub refund_percent: f64,
    pub total_tickets: u64,
    pub won_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Winner {
    /// Snapshot `entrant` with a fresh record id.
    pub fn from_entrant(entrant: &Entrant, won_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            entrant_id: entrant.id,
            name: entrant.name.clone(),
            supervisor: entrant.supervisor.clone(),
            department: entrant.department.clone(),
            nps: entrant.nps,
            nrpc: entrant.nrpc,
            refund_percent: entrant.refund_percent,
            total_tickets: entrant.total_tickets,
            won_at,
            created_at: won_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolStats {
    pub available_count: usize,
    /// Wider than a single entrant's count so the sum cannot overflow.
    pub total_tickets: u128,
    pub average_nps: f64,
}

impl PoolStats {
    pub fn empty() -> Self {
        Self {
            available_count: 0,
            total_tickets: 0,
            average_nps: 0.0,
        }
    }
}

/// Per-department numbers shown next to each department choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentSummary {
    pub department: String,
    pub available: usize,
    pub tickets: u128,
}
