//! `TickExecutor` — barrier-synchronized, per-tick execution of runnables.
//!
//! # One tick
//!
//! ```text
//! ① snapshot + clear the scheduled set      (agents rescheduled during ③
//!                                             land in the next tick's set)
//! ② order by AgentId; shuffle if seeded
//! ③ run every runnable on the worker pool   (panics caught per runnable)
//! ④ barrier: wait for all of them
//! ⑤ advance current_tick, record duration
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Step ③ runs on                                        |
//! |------------|-------------------------------------------------------|
//! | `parallel` | a Rayon pool of `config.num_threads` workers          |
//! | (none)     | the calling thread, one runnable after another        |

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use apl_agent::Action;
use apl_core::{AgentId, EngineConfig, SimRng, Tick};
use parking_lot::Mutex;
use tracing::{debug, error};

use crate::runnable::panic_message;
use crate::{DeliberationRunnable, Platform, SimResult};

#[cfg(feature = "parallel")]
use crate::SimError;

/// Per-tick action lists, keyed by agent.  An agent whose runnable panicked
/// has no entry.
pub type TickActions = BTreeMap<AgentId, Vec<Action>>;

pub struct TickExecutor {
    scheduled:          Mutex<BTreeMap<AgentId, Arc<DeliberationRunnable>>>,
    current_tick:       AtomicU64,
    last_tick_duration: Mutex<Duration>,
    rng:                Option<Mutex<SimRng>>,
    running:            AtomicBool,
    shut_down:          AtomicBool,
    #[cfg(feature = "parallel")]
    pool:               rayon::ThreadPool,
}

impl TickExecutor {
    pub fn new(config: &EngineConfig) -> SimResult<Self> {
        config.validate()?;

        #[cfg(feature = "parallel")]
        let pool = rayon::ThreadPoolBuilder::new()
            // 0 lets Rayon pick one worker per core.
            .num_threads(config.num_threads.unwrap_or(0))
            .thread_name(|i| format!("apl-worker-{i}"))
            .build()
            .map_err(|e| SimError::ThreadPool(e.to_string()))?;

        Ok(Self {
            scheduled: Mutex::new(BTreeMap::new()),
            current_tick: AtomicU64::new(0),
            last_tick_duration: Mutex::new(Duration::ZERO),
            rng: config.seed.map(|seed| Mutex::new(SimRng::new(seed))),
            running: AtomicBool::new(false),
            shut_down: AtomicBool::new(false),
            #[cfg(feature = "parallel")]
            pool,
        })
    }

    // ── Scheduling ────────────────────────────────────────────────────────

    /// Queue `runnable` for the next tick.  Returns `false` if its agent is
    /// already queued or the executor is shut down.
    pub fn schedule_for_next_tick(&self, runnable: Arc<DeliberationRunnable>) -> bool {
        if self.is_shut_down() {
            return false;
        }
        let mut scheduled = self.scheduled.lock();
        let id = runnable.agent_id();
        if scheduled.contains_key(&id) {
            return false;
        }
        scheduled.insert(id, runnable);
        true
    }

    /// Ids of the agents queued for the next tick, ascending.
    pub fn scheduled_agents(&self) -> Vec<AgentId> {
        self.scheduled.lock().keys().copied().collect()
    }

    pub fn nof_scheduled_agents(&self) -> usize {
        self.scheduled.lock().len()
    }

    // ── Ticking ───────────────────────────────────────────────────────────

    /// Run one tick.  Blocks until every runnable of the tick has finished.
    /// After [`shutdown`](Self::shutdown) this returns an empty map and does
    /// not advance the tick.
    pub fn do_tick(&self, platform: &Platform) -> TickActions {
        if self.is_shut_down() {
            return TickActions::new();
        }
        self.running.store(true, Ordering::Release);
        let started = Instant::now();

        let mut batch: Vec<Arc<DeliberationRunnable>> =
            std::mem::take(&mut *self.scheduled.lock()).into_values().collect();
        if let Some(rng) = &self.rng {
            rng.lock().shuffle(&mut batch);
        }
        let nof_agents = batch.len();
        let actions = self.run_batch(platform, batch);

        let tick = Tick(self.current_tick.fetch_add(1, Ordering::AcqRel));
        let elapsed = started.elapsed();
        *self.last_tick_duration.lock() = elapsed;
        self.running.store(false, Ordering::Release);
        debug!(%tick, agents = nof_agents, ms = elapsed.as_millis() as u64, "tick done");
        actions
    }

    #[cfg(feature = "parallel")]
    fn run_batch(&self, platform: &Platform, batch: Vec<Arc<DeliberationRunnable>>) -> TickActions {
        use rayon::prelude::*;

        self.pool.install(|| {
            batch
                .par_iter()
                .filter_map(|runnable| run_isolated(runnable, platform))
                .collect()
        })
    }

    #[cfg(not(feature = "parallel"))]
    fn run_batch(&self, platform: &Platform, batch: Vec<Arc<DeliberationRunnable>>) -> TickActions {
        batch
            .iter()
            .filter_map(|runnable| run_isolated(runnable, platform))
            .collect()
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// The tick the next `do_tick` call will run.
    pub fn current_tick(&self) -> Tick {
        Tick(self.current_tick.load(Ordering::Acquire))
    }

    pub fn last_tick_duration(&self) -> Duration {
        *self.last_tick_duration.lock()
    }

    /// `true` while a tick is in progress.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn num_threads(&self) -> usize {
        #[cfg(feature = "parallel")]
        {
            self.pool.current_num_threads()
        }
        #[cfg(not(feature = "parallel"))]
        {
            1
        }
    }

    /// Refuse all further scheduling and drop whatever is queued.
    pub fn shutdown(&self) {
        self.shut_down.store(true, Ordering::Release);
        self.scheduled.lock().clear();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }
}

/// Run one runnable.  An escaped panic, or an agent that was already done
/// and only shut down, leaves no map entry.
fn run_isolated(runnable: &Arc<DeliberationRunnable>, platform: &Platform) -> Option<(AgentId, Vec<Action>)> {
    let id = runnable.agent_id();
    match catch_unwind(AssertUnwindSafe(|| runnable.run(platform))) {
        Ok(actions) => actions.map(|actions| (id, actions)),
        Err(panic) => {
            error!(agent = %id, panic = %panic_message(&*panic), "runnable panicked");
            platform.deregister(id);
            None
        }
    }
}
