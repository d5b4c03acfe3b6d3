//! Tick hooks for progress reporting and data collection.

use std::time::Duration;

use apl_core::Tick;

use crate::executor::TickActions;

/// Callbacks invoked by [`SimulationEngine`][crate::SimulationEngine] around
/// each tick.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — action counter
///
/// ```rust
/// use std::time::Duration;
///
/// use apl_core::Tick;
/// use apl_sim::{TickActions, TickHook};
///
/// struct CountActions { total: usize }
///
/// impl TickHook for CountActions {
///     fn on_tick_end(&mut self, _tick: Tick, _duration: Duration, actions: &TickActions) {
///         self.total += actions.values().map(Vec::len).sum::<usize>();
///     }
/// }
/// ```
pub trait TickHook {
    /// Called before the executor runs `tick`.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after the barrier of `tick`, with every agent's actions.
    fn on_tick_end(&mut self, _tick: Tick, _duration: Duration, _actions: &TickActions) {}

    /// Called once when [`run`][crate::SimulationEngine::run] finishes.
    /// `last_tick` is the number of ticks run.
    fn on_simulation_end(&mut self, _last_tick: Tick, _last_duration: Duration) {}
}

/// A [`TickHook`] that does nothing.
pub struct NoopHook;

impl TickHook for NoopHook {}

/// Handle returned by [`register_hook`][crate::SimulationEngine::register_hook].
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct HookId(pub(crate) u64);
