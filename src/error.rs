//! Session start-up errors
//!
//! Steady-state play has no error paths: blocked moves and duplicate bombs are
//! no-ops. Everything here is raised before a session enters `Running`.

use thiserror::Error;

use crate::settings::SettingsError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("{requested} enemies requested but the generated board only has {available} empty cells")]
    NotEnoughRoom { requested: usize, available: usize },
    #[error("placed {placed} of {requested} enemies before giving up after {attempts} attempts")]
    SpawnExhausted {
        placed: usize,
        requested: usize,
        attempts: usize,
    },
}
