use crate::error::{RaffleError, Result};
use crate::pool;
use crate::types::Entrant;
use std::collections::HashSet;
use std::path::Path;

/// The static collection of eligible entrants.
#[derive(Debug, Clone)]
pub struct Roster {
    entrants: Vec<Entrant>,
}

impl Roster {
    pub fn new(entrants: Vec<Entrant>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(entrants.len());
        for entrant in &entrants {
            if !seen.insert(entrant.id) {
                return Err(RaffleError::DuplicateEntrant { id: entrant.id });
            }
        }

        Ok(Self { entrants })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let entrants: Vec<Entrant> = serde_json::from_str(json)?;
        Self::new(entrants)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            RaffleError::config(format!(
                "Failed to read entrants from {}: {}",
                path.display(),
                e
            ))
        })?;

        let roster = Self::from_json(&content)?;
        tracing::info!(
            "Loaded {} entrants from {}",
            roster.len(),
            path.display()
        );
        Ok(roster)
    }

    pub fn entrants(&self) -> &[Entrant] {
        &self.entrants
    }

    pub fn len(&self) -> usize {
        self.entrants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entrants.is_empty()
    }

    pub fn departments(&self) -> Vec<String> {
        pool::distinct_departments(&self.entrants)
    }
}
