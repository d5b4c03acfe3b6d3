//! `DeliberationRunnable` — drives one agent through one cycle.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Weak};

use apl_agent::{Action, Agent, PlanInterface, Rescheduler};
use apl_core::AgentId;
use apl_deliberation::{DeliberationCycle, DeliberationError};
use tracing::{debug, error, info, warn};

use crate::Platform;

/// One agent plus the cycle that drives it.  Its identity is the agent's id;
/// the executor schedules at most one runnable per id per tick.
pub struct DeliberationRunnable {
    agent: Arc<Agent>,
    cycle: Arc<DeliberationCycle>,
}

impl DeliberationRunnable {
    pub fn new(agent: Arc<Agent>, cycle: Arc<DeliberationCycle>) -> Self {
        Self { agent, cycle }
    }

    #[inline]
    pub fn agent_id(&self) -> AgentId {
        self.agent.id()
    }

    pub fn agent(&self) -> &Arc<Agent> {
        &self.agent
    }

    /// Run one cycle and decide what happens next:
    ///
    /// | After the cycle                | Next                                 |
    /// |--------------------------------|--------------------------------------|
    /// | agent done (before or after)   | shutdown plans once, deregister      |
    /// | awake                          | rescheduled for the next tick        |
    /// | asleep                         | parked until a producer wakes it     |
    /// | fatal error or panic           | deregistered, shutdown plans skipped |
    ///
    /// Returns `None` when no cycle ran because the agent was already done.
    pub fn run(self: &Arc<Self>, platform: &Platform) -> Option<Vec<Action>> {
        let id = self.agent_id();
        if self.agent.is_done() {
            self.shutdown(platform);
            return None;
        }

        let messenger = platform.messenger();
        let outcome = catch_unwind(AssertUnwindSafe(|| self.cycle.run(&self.agent, messenger)));
        let err = match outcome {
            Ok(Ok(actions)) => {
                if self.agent.is_done() {
                    self.shutdown(platform);
                } else if !self.agent.check_sleeping() {
                    platform.schedule_for_execution(Arc::clone(self));
                    debug!(agent = %id, "rescheduled");
                }
                return Some(actions);
            }
            Ok(Err(err)) => err,
            Err(panic) => DeliberationError::Panicked { agent: id, message: panic_message(&*panic) },
        };

        error!(agent = %id, %err, "agent killed");
        self.agent.force_stop();
        self.agent.take_shutdown_plans();
        platform.deregister(id);
        Some(Vec::new())
    }

    /// Run the shutdown plans (at most once over the agent's life), notify
    /// death listeners and deregister.  Plan failures are logged, never
    /// propagated.
    fn shutdown(&self, platform: &Platform) {
        let id = self.agent_id();
        let plans = self.agent.take_shutdown_plans();
        if !plans.is_empty() {
            let messenger = platform.messenger();
            let mut iface = PlanInterface::new(&self.agent, messenger);
            for mut plan in plans {
                match catch_unwind(AssertUnwindSafe(|| plan.execute(&mut iface))) {
                    Ok(Ok(_)) => {}
                    Ok(Err(err)) => warn!(agent = %id, %err, "shutdown plan failed"),
                    Err(panic) => {
                        warn!(agent = %id, panic = %panic_message(&*panic), "shutdown plan panicked")
                    }
                }
            }
        }
        self.agent.force_stop();
        if platform.deregister(id).is_some() {
            info!(agent = %id, "agent shut down");
        }
    }
}

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

// ── SelfRescheduler ───────────────────────────────────────────────────────────

/// Schedules the agent's own runnable when a producer wakes it.  Holds both
/// ends weakly so the platform and the agent never keep each other alive.
pub(crate) struct SelfRescheduler {
    pub(crate) platform: Weak<Platform>,
    pub(crate) runnable: Weak<DeliberationRunnable>,
}

impl Rescheduler for SelfRescheduler {
    fn wake_up(&self) {
        if let (Some(platform), Some(runnable)) = (self.platform.upgrade(), self.runnable.upgrade()) {
            platform.schedule_for_execution(runnable);
        }
    }
}
