//! Error types for apl-agent.

use apl_core::AgentId;
use thiserror::Error;

/// Errors raised by agent-level operations.
///
/// `MissingRescheduler` and `NoConcurrencyContext` are configuration errors
/// and are returned immediately instead of degrading silently.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("{0} must be woken but has no self-rescheduler installed")]
    MissingRescheduler(AgentId),

    #[error("{0} has no ConcurrencyContext")]
    NoConcurrencyContext(AgentId),

    #[error("message receiver {0} not found")]
    ReceiverNotFound(AgentId),
}

pub type AgentResult<T> = Result<T, AgentError>;
