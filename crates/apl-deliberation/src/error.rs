use apl_agent::AgentError;
use apl_core::AgentId;
use thiserror::Error;

/// Errors that end an agent.  Recoverable plan failures never surface here;
/// they become internal triggers.
#[derive(Debug, Error)]
pub enum DeliberationError {
    #[error("{agent}: fatal plan failure: {reason}")]
    Fatal { agent: AgentId, reason: String },

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("{agent}: deliberation panicked: {message}")]
    Panicked { agent: AgentId, message: String },
}

pub type DeliberationResult<T> = Result<T, DeliberationError>;
