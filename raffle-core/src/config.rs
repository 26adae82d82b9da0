use crate::error::{RaffleError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const MIN_WINNERS: u32 = 1;
pub const MAX_WINNERS: u32 = 28;
pub const DEFAULT_MAX_WINNERS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawFrom {
    All,
    Departments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawMode {
    Uniform,
    Weighted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaffleSettings {
    pub max_winners: u32,
    pub draw_from: DrawFrom,
    pub selected_departments: BTreeSet<String>,
    /// Bias selection by each entrant's ticket count.
    #[serde(default)]
    pub weighted: bool,
}

impl Default for RaffleSettings {
    fn default() -> Self {
        Self {
            max_winners: DEFAULT_MAX_WINNERS,
            draw_from: DrawFrom::All,
            selected_departments: BTreeSet::new(),
            weighted: false,
        }
    }
}

impl RaffleSettings {
    /// Store `max_winners` clamped into `MIN_WINNERS..=MAX_WINNERS`.
    pub fn set_max_winners(&mut self, max_winners: u32) {
        self.max_winners = max_winners.clamp(MIN_WINNERS, MAX_WINNERS);
    }

    /// Draw from every department. Any previous selection is dropped.
    pub fn draw_from_all(&mut self) {
        self.draw_from = DrawFrom::All;
        self.selected_departments.clear();
    }

    pub fn draw_from_departments<I, S>(&mut self, departments: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.draw_from = DrawFrom::Departments;
        self.selected_departments = departments.into_iter().map(Into::into).collect();
    }

    /// Add `department` to the selection, or remove it if already selected.
    pub fn toggle_department(&mut self, department: &str) {
        if !self.selected_departments.remove(department) {
            self.selected_departments.insert(department.to_string());
        }
    }

    /// The department filter to apply, or `None` when unrestricted.
    ///
    /// An empty selection under `DrawFrom::Departments` is unrestricted.
    pub fn department_filter(&self) -> Option<&BTreeSet<String>> {
        match self.draw_from {
            DrawFrom::Departments if !self.selected_departments.is_empty() => {
                Some(&self.selected_departments)
            }
            _ => None,
        }
    }

    pub fn draw_mode(&self) -> DrawMode {
        if self.weighted {
            DrawMode::Weighted
        } else {
            DrawMode::Uniform
        }
    }

    /// Drop a stale selection left behind under `DrawFrom::All`.
    pub fn normalize(&mut self) {
        if self.draw_from == DrawFrom::All && !self.selected_departments.is_empty() {
            tracing::debug!(
                "Ignoring {} selected departments while drawing from all",
                self.selected_departments.len()
            );
            self.selected_departments.clear();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_WINNERS..=MAX_WINNERS).contains(&self.max_winners) {
            return Err(RaffleError::config(format!(
                "Max winners must be between {} and {}, got {}",
                MIN_WINNERS, MAX_WINNERS, self.max_winners
            )));
        }

        Ok(())
    }
}
