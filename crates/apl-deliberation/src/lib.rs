//! `apl-deliberation` — the agent's sense→reason→act cycle.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                        |
//! |-------------|-----------------------------------------------------------------|
//! | [`apply`]   | the interceptor-then-scheme matching algorithm                  |
//! | [`step`]    | `DeliberationStep` trait and the four standard steps            |
//! | [`execute`] | `ExecutePlans`, the action phase                                |
//! | [`cycle`]   | `DeliberationCycle` (ordered steps + action phase)              |
//! | [`error`]   | `DeliberationError`, `DeliberationResult<T>`                    |
//!
//! # Phase order
//!
//! ```text
//! goals → external triggers → internal triggers → messages → plans
//! ```
//!
//! Only the last phase runs plan bodies and emits actions.  The four earlier
//! phases only move triggers into plans.

pub mod apply;
pub mod cycle;
pub mod error;
pub mod execute;
pub mod step;

#[cfg(test)]
mod tests;

pub use apply::apply;
pub use cycle::DeliberationCycle;
pub use error::{DeliberationError, DeliberationResult};
pub use execute::ExecutePlans;
pub use step::{
    ApplyExternalTriggers, ApplyGoals, ApplyInternalTriggers, ApplyMessages, DeliberationStep,
};
