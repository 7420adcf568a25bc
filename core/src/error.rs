use crate::engine::RunStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid configuration: {field} {reason}")]
    Config { field: &'static str, reason: String },

    #[error("advance_day() called on a run that is {status:?}; call reset() first")]
    InvalidState { status: RunStatus },

    #[error("Individual index {index} out of bounds for population of {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Simulation worker disconnected")]
    WorkerDisconnected,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SimError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Config { field, reason: reason.into() }
    }
}

pub type SimResult<T> = Result<T, SimError>;
