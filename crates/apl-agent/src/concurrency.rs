//! Off-cycle work: a rayon pool for tasks too long to run inside a plan.
//!
//! Plans never block.  A plan hands long-running work to the agent's
//! `ConcurrencyContext` (stored in its [`ContextContainer`][crate::ContextContainer])
//! through [`PlanInterface::notify_when_finished`][crate::PlanInterface::notify_when_finished]
//! or [`PlanInterface::adopt_plan_when_finished`][crate::PlanInterface::adopt_plan_when_finished];
//! the completion callback wakes the agent.

use std::sync::Arc;

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use tracing::error;

/// Cheap-to-clone handle on a shared task pool.  Several agents may share one.
#[derive(Clone)]
pub struct ConcurrencyContext {
    pool: Arc<ThreadPool>,
}

impl ConcurrencyContext {
    /// A dedicated pool of `num_threads` workers.  A panicking task is logged
    /// and does not take the pool down.
    pub fn new(num_threads: usize) -> Result<Self, ThreadPoolBuildError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("apl-task-{i}"))
            .panic_handler(|_| error!("concurrent task panicked"))
            .build()?;
        Ok(Self { pool: Arc::new(pool) })
    }

    pub fn from_pool(pool: Arc<ThreadPool>) -> Self {
        Self { pool }
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Fire-and-forget.
    pub fn spawn<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.pool.spawn(task);
    }
}
