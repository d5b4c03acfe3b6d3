//! Fluent builder for constructing a [`Platform`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::AtomicU32;

use apl_agent::{DefaultMessenger, Messenger};
use apl_core::EngineConfig;
use apl_deliberation::DeliberationCycle;
use parking_lot::RwLock;

use crate::{Platform, SimResult, TickExecutor};

/// Fluent builder for [`Platform`].
///
/// # Optional inputs (have defaults)
///
/// | Method          | Default                            |
/// |-----------------|------------------------------------|
/// | `.messenger(m)` | `DefaultMessenger`                 |
/// | `.cycle(c)`     | `DeliberationCycle::standard()`    |
///
/// # Example
///
/// ```rust
/// use apl_core::EngineConfig;
/// use apl_sim::PlatformBuilder;
///
/// let platform = PlatformBuilder::new(EngineConfig::new(2, 10).with_seed(7))
///     .build()
///     .unwrap();
/// assert_eq!(platform.nof_agents(), 0);
/// ```
pub struct PlatformBuilder {
    config:    EngineConfig,
    messenger: Option<Arc<dyn Messenger>>,
    cycle:     Option<DeliberationCycle>,
}

impl PlatformBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self { config, messenger: None, cycle: None }
    }

    pub fn messenger(mut self, messenger: Arc<dyn Messenger>) -> Self {
        self.messenger = Some(messenger);
        self
    }

    pub fn cycle(mut self, cycle: DeliberationCycle) -> Self {
        self.cycle = Some(cycle);
        self
    }

    /// Validate the config, build the worker pool and return the platform.
    pub fn build(self) -> SimResult<Arc<Platform>> {
        let executor = TickExecutor::new(&self.config)?;
        let messenger = self.messenger.unwrap_or_else(|| Arc::new(DefaultMessenger::new()));
        let cycle = Arc::new(self.cycle.unwrap_or_else(DeliberationCycle::standard));

        Ok(Arc::new_cyclic(|me| Platform {
            me: me.clone(),
            config: self.config,
            executor,
            messenger,
            cycle,
            agents: RwLock::new(BTreeMap::new()),
            next_id: AtomicU32::new(0),
        }))
    }
}
