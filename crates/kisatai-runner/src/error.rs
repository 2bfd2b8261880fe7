use kisatai_combat::error::RosterError;

use crate::config::ConfigError;

/// Failures while setting up a run. Once the loop starts nothing fails.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not start match: {0}")]
    Roster(#[from] RosterError),
}
