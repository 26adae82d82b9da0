use anyhow::{Context, Result};
use raffle_core::RaffleSettings;
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "settings.json";
const ENTRANTS_FILE: &str = "guides.json";

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub data_dir: PathBuf,
    pub entrants_path: PathBuf,
}

impl CliConfig {
    pub fn new(data_dir: Option<PathBuf>, entrants: Option<PathBuf>) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);
        let entrants_path = entrants.unwrap_or_else(|| data_dir.join(ENTRANTS_FILE));

        Self {
            data_dir,
            entrants_path,
        }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }

    /// Saved raffle settings, or the defaults when none were saved yet.
    pub async fn load_settings(&self) -> Result<RaffleSettings> {
        load_settings(&self.settings_path()).await
    }

    pub async fn save_settings(&self, settings: &RaffleSettings) -> Result<()> {
        let path = self.settings_path();
        let content = serde_json::to_string_pretty(settings)?;
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;

        tracing::debug!("Saved settings to {}", path.display());
        Ok(())
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("raffle")
}

async fn load_settings(path: &Path) -> Result<RaffleSettings> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Ok(RaffleSettings::default());
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;
    let mut settings: RaffleSettings = serde_json::from_str(&content)
        .with_context(|| format!("Invalid settings file {}", path.display()))?;
    settings.normalize();
    settings.validate()?;

    Ok(settings)
}
