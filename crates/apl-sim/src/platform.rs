//! `Platform` — the explicit handle tying agents, messenger and executor
//! together.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};

use apl_agent::{Agent, AgentArguments, Messenger};
use apl_core::{AgentId, EngineConfig};
use apl_deliberation::DeliberationCycle;
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::executor::TickActions;
use crate::runnable::SelfRescheduler;
use crate::{DeliberationRunnable, SimError, SimResult, TickExecutor};

/// Registry of the local agents plus the services they share.
///
/// Always handled as `Arc<Platform>` (built by
/// [`PlatformBuilder`][crate::PlatformBuilder]); agents reach it only through
/// weak self-reschedulers.
pub struct Platform {
    pub(crate) me:        Weak<Platform>,
    pub(crate) config:    EngineConfig,
    pub(crate) executor:  TickExecutor,
    pub(crate) messenger: Arc<dyn Messenger>,
    pub(crate) cycle:     Arc<DeliberationCycle>,
    pub(crate) agents:    RwLock<BTreeMap<AgentId, Arc<DeliberationRunnable>>>,
    pub(crate) next_id:   AtomicU32,
}

impl Platform {
    /// Create, register and schedule a new agent.  It runs its first cycle in
    /// the next tick.
    pub fn spawn(&self, arguments: AgentArguments) -> SimResult<AgentId> {
        if self.executor.is_shut_down() {
            return Err(SimError::ShutDown);
        }
        let id = AgentId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let agent = Agent::new(id, arguments);
        let runnable = Arc::new(DeliberationRunnable::new(Arc::clone(&agent), Arc::clone(&self.cycle)));

        agent.set_rescheduler(Box::new(SelfRescheduler {
            platform: Weak::clone(&self.me),
            runnable: Arc::downgrade(&runnable),
        }));
        self.messenger.register(Arc::clone(&agent));
        self.agents.write().insert(id, Arc::clone(&runnable));
        self.executor.schedule_for_next_tick(runnable);
        agent.invoke();

        info!(agent = %id, "agent registered");
        Ok(id)
    }

    pub fn agent(&self, id: AgentId) -> Option<Arc<Agent>> {
        self.agents.read().get(&id).map(|r| Arc::clone(r.agent()))
    }

    /// All registered agents, ascending by id.
    pub fn local_agents(&self) -> Vec<Arc<Agent>> {
        self.agents.read().values().map(|r| Arc::clone(r.agent())).collect()
    }

    pub fn nof_agents(&self) -> usize {
        self.agents.read().len()
    }

    /// Stop an agent.  Its shutdown plans run and it is deregistered in the
    /// next tick, or at the end of a cycle already in flight.  Returns `false`
    /// for unknown agents.
    pub fn kill_agent(&self, id: AgentId) -> bool {
        let Some(runnable) = self.agents.read().get(&id).cloned() else {
            warn!(agent = %id, "kill requested for unknown agent");
            return false;
        };
        runnable.agent().force_stop();
        self.executor.schedule_for_next_tick(runnable);
        true
    }

    /// Remove an agent from the registry and the messenger.
    pub fn deregister(&self, id: AgentId) -> Option<Arc<Agent>> {
        let runnable = self.agents.write().remove(&id);
        self.messenger.deregister(id);
        runnable.map(|r| Arc::clone(r.agent()))
    }

    pub fn schedule_for_execution(&self, runnable: Arc<DeliberationRunnable>) -> bool {
        self.executor.schedule_for_next_tick(runnable)
    }

    /// Run one tick of every scheduled agent.
    pub fn do_tick(&self) -> TickActions {
        self.executor.do_tick(self)
    }

    pub fn executor(&self) -> &TickExecutor {
        &self.executor
    }

    pub fn messenger(&self) -> &dyn Messenger {
        self.messenger.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
