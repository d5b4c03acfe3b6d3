use apl_core::AplError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] AplError),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),

    #[error("platform is shut down")]
    ShutDown,
}

pub type SimResult<T> = Result<T, SimError>;
