//! Error types for the commander engine.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Phase \"{phase}\" timed out after {timeout_ms}ms")]
    PhaseTimeout { phase: String, timeout_ms: u64 },

    #[error("Interrupted: {0}")]
    Interrupted(String),

    #[error("All {attempts} phase(s) failed; last error: {last_error}")]
    AllPhasesFailed { attempts: usize, last_error: String },

    #[error("Invalid transition: {0}")]
    Transition(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Worker error: {0}")]
    Worker(String),

    #[error("No candidates: {0}")]
    NoCandidates(String),

    #[error("Planner error: {0}")]
    Planner(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error ends the mission once it reaches mission level.
    ///
    /// Everything else is downgraded to a failed phase at the phase boundary.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::InvalidAmount(_) | Error::Interrupted(_) | Error::AllPhasesFailed { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
