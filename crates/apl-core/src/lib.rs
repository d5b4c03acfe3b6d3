//! `apl-core` — foundational types for the `rust_apl` agent engine.
//!
//! This crate is a dependency of every other `apl-*` crate.  It intentionally
//! has no `apl-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`                                             |
//! | [`time`]        | `Tick`                                                |
//! | [`config`]      | `EngineConfig` (threads, seed, tick budget)           |
//! | [`payload`]     | `Payload` — type-erased, identity-compared content   |
//! | [`rng`]         | `SimRng` (scheduler shuffle)                          |
//! | [`error`]       | `AplError`, `AplResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids, ticks and config.   |

pub mod config;
pub mod error;
pub mod ids;
pub mod payload;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::EngineConfig;
pub use error::{AplError, AplResult};
pub use ids::AgentId;
pub use payload::Payload;
pub use rng::SimRng;
pub use time::Tick;
