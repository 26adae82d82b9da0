use anyhow::{Context, Result};
use dialoguer::Confirm;

pub mod configure;
pub mod draw;
pub mod pool;
pub mod winners;

pub use configure::{handle_configure, ConfigureArgs};
pub use draw::handle_draw;
pub use pool::{show_departments, show_pool};
pub use winners::{handle_purge, handle_winners_command, WinnersCommands};

/// Ask a yes/no question on the terminal.
pub fn confirm(prompt: impl Into<String>, default: bool) -> Result<bool> {
    confirmation(
        Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact(),
    )
}

fn confirmation(answer: dialoguer::Result<bool>) -> Result<bool> {
    answer.context("Failed to read confirmation")
}
