//! `SimulationEngine` — drives the platform tick by tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use apl_core::Tick;
use tracing::info;

use crate::executor::TickActions;
use crate::{HookId, Platform, TickHook};

/// Cloneable handle that stops a running [`SimulationEngine`] after its
/// current tick.  Usable from any thread, including from inside plans.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

pub struct SimulationEngine {
    platform:  Arc<Platform>,
    hooks:     Vec<(HookId, Box<dyn TickHook>)>,
    next_hook: u64,
    stop:      StopHandle,
}

impl SimulationEngine {
    pub fn new(platform: Arc<Platform>) -> Self {
        Self {
            platform,
            hooks: Vec::new(),
            next_hook: 0,
            stop: StopHandle::default(),
        }
    }

    pub fn platform(&self) -> &Arc<Platform> {
        &self.platform
    }

    // ── Hooks ─────────────────────────────────────────────────────────────

    /// Hooks are called in registration order.
    pub fn register_hook(&mut self, hook: impl TickHook + 'static) -> HookId {
        let id = HookId(self.next_hook);
        self.next_hook += 1;
        self.hooks.push((id, Box::new(hook)));
        id
    }

    pub fn deregister_hook(&mut self, id: HookId) -> Option<Box<dyn TickHook>> {
        let pos = self.hooks.iter().position(|(h, _)| *h == id)?;
        Some(self.hooks.remove(pos).1)
    }

    pub fn nof_hooks(&self) -> usize {
        self.hooks.len()
    }

    // ── Stopping ──────────────────────────────────────────────────────────

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    // ── Running ───────────────────────────────────────────────────────────

    /// Run until `config.total_ticks` is reached or the engine is stopped,
    /// then notify hooks and shut the executor down.  Returns the number of
    /// ticks run in total.
    pub fn run(&mut self) -> Tick {
        let end = self.platform.config().end_tick();
        while !self.stop.is_stopped() {
            let now = self.platform.executor().current_tick();
            if end.is_some_and(|end| now >= end) {
                break;
            }
            self.step();
        }

        let executor = self.platform.executor();
        let last_tick = executor.current_tick();
        let last_duration = executor.last_tick_duration();
        for (_, hook) in &mut self.hooks {
            hook.on_simulation_end(last_tick, last_duration);
        }
        executor.shutdown();
        info!(tick = %last_tick, agents = self.platform.nof_agents(), "simulation finished");
        last_tick
    }

    /// Run exactly `n` ticks (ignores `total_ticks` and the stop flag).
    /// Useful for tests and incremental stepping.
    pub fn run_ticks(&mut self, n: u64) -> Tick {
        for _ in 0..n {
            self.step();
        }
        self.platform.executor().current_tick()
    }

    fn step(&mut self) -> TickActions {
        let tick = self.platform.executor().current_tick();
        for (_, hook) in &mut self.hooks {
            hook.on_tick_start(tick);
        }
        let actions = self.platform.do_tick();
        let duration = self.platform.executor().last_tick_duration();
        for (_, hook) in &mut self.hooks {
            hook.on_tick_end(tick, duration, &actions);
        }
        actions
    }
}
