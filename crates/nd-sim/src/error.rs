use nd_core::NdError;
use nd_data::StateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    /// A selection mechanism classified a piece into both terminal sets.
    /// Replay determinism is corrupted at this point; the run aborts.
    #[error("state invariant violated: {0}")]
    Invariant(#[from] StateError),

    #[error(transparent)]
    Core(#[from] NdError),
}

pub type SimResult<T> = Result<T, SimError>;
