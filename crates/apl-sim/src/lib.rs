//! `apl-sim` — scheduling and driving agents for the rust_apl engine.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks (or until stopped):
//!   ① hooks.on_tick_start
//!   ② TickExecutor::do_tick — every scheduled agent runs one deliberation
//!      cycle on the worker pool; hard barrier at the end
//!   ③ each runnable decides: reschedule (awake), park (asleep), or
//!      shut down (done / fatal)
//!   ④ hooks.on_tick_end with the per-agent action map
//! ```
//!
//! Sleeping agents cost nothing: they are only scheduled again when a
//! producer (message, trigger, goal, async plan) wakes them.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | (default) Runs agent cycles on a Rayon thread pool.      |
//!
//! # Quick-start
//!
//! ```rust
//! use apl_agent::{AgentArguments, Plan};
//! use apl_core::{EngineConfig, Payload};
//! use apl_sim::{PlatformBuilder, SimulationEngine};
//!
//! let platform = PlatformBuilder::new(EngineConfig::new(2, 3)).build().unwrap();
//! platform
//!     .spawn(AgentArguments::new().initial_plan(Plan::run_once(|_| Ok(Some(Payload::new("hi"))))))
//!     .unwrap();
//!
//! let mut engine = SimulationEngine::new(platform);
//! assert_eq!(engine.run().0, 3);
//! ```

pub mod builder;
pub mod engine;
pub mod error;
pub mod executor;
pub mod hook;
pub mod platform;
pub mod runnable;


pub use builder::PlatformBuilder;
pub use engine::{SimulationEngine, StopHandle};
pub use error::{SimError, SimResult};
pub use executor::{TickActions, TickExecutor};
pub use hook::{HookId, NoopHook, TickHook};
pub use platform::Platform;
pub use runnable::DeliberationRunnable;
