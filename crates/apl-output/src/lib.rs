//! `apl-output` — tick time log for the rust_apl engine.
//!
//! # Usage
//!
//! ```rust,no_run
//! use apl_core::EngineConfig;
//! use apl_output::TimeLogHook;
//! use apl_sim::{PlatformBuilder, SimulationEngine};
//!
//! let config = EngineConfig::new(4, 100).with_env_overrides().unwrap();
//! let platform = PlatformBuilder::new(config.clone()).build().unwrap();
//! let mut engine = SimulationEngine::new(platform);
//!
//! let errors = match TimeLogHook::from_config(&config).unwrap() {
//!     Some(hook) => {
//!         let errors = hook.errors();
//!         engine.register_hook(hook);
//!         Some(errors)
//!     }
//!     None => None,
//! };
//! engine.run();
//! if let Some(e) = errors.and_then(|e| e.take()) {
//!     eprintln!("time log error: {e}");
//! }
//! ```
//!
//! # Output
//!
//! | Column             | Meaning                                        |
//! |--------------------|------------------------------------------------|
//! | `tick`             | Tick index, starting at 0                      |
//! | `started_unix_ms`  | Wall clock when the tick started               |
//! | `finished_unix_ms` | Wall clock when the tick barrier completed     |
//! | `tick_duration_ms` | Executor-measured tick duration                |
//! | `agents`           | Agents that ran a deliberation cycle           |
//! | `actions`          | Actions produced across all agents             |

pub mod csv;
pub mod error;
pub mod hook;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use crate::csv::CsvTimeLog;
pub use error::{OutputError, OutputResult};
pub use hook::{TimeLogErrors, TimeLogHook};
pub use row::TickTimeRow;
pub use writer::TimeLogWriter;
