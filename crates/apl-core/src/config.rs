//! Engine configuration.
//!
//! Typically built in code by the application crate, or loaded from a
//! TOML/JSON file (with the `serde` feature), then passed to the platform
//! builder.  [`EngineConfig::with_env_overrides`] lets a deployment adjust a
//! run without recompiling.

use std::path::PathBuf;

use crate::{AplError, AplResult, Tick};

/// Environment variable overriding [`EngineConfig::num_threads`].
pub const ENV_THREADS: &str = "APL_THREADS";
/// Environment variable overriding [`EngineConfig::seed`].
pub const ENV_SEED: &str = "APL_SEED";
/// Environment variable overriding [`EngineConfig::total_ticks`].
pub const ENV_TICKS: &str = "APL_TICKS";
/// Environment variable naming the per-tick time-log CSV file.
pub const ENV_TIMELOG: &str = "APL_TIMELOG";

// ── EngineConfig ──────────────────────────────────────────────────────────────

/// Top-level engine configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Worker thread count for the tick pool.  `None` uses all logical cores.
    pub num_threads: Option<usize>,

    /// Seed for the per-tick submission shuffle.  `None` submits runnables in
    /// ascending `AgentId` order.
    pub seed: Option<u64>,

    /// Ticks to run.  `None` runs until the engine is stopped.
    pub total_ticks: Option<u64>,

    /// Where to write the per-tick time log, if anywhere.
    pub time_log: Option<PathBuf>,
}

impl EngineConfig {
    /// A config that runs `total_ticks` ticks on `num_threads` workers.
    pub fn new(num_threads: usize, total_ticks: u64) -> Self {
        Self {
            num_threads: Some(num_threads),
            total_ticks: Some(total_ticks),
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The tick at which a bounded run ends (exclusive), if bounded.
    #[inline]
    pub fn end_tick(&self) -> Option<Tick> {
        self.total_ticks.map(Tick)
    }

    /// Reject configurations the engine cannot run.
    pub fn validate(&self) -> AplResult<()> {
        if self.num_threads == Some(0) {
            return Err(AplError::Config("num_threads must be at least 1".into()));
        }
        Ok(())
    }

    /// Apply `APL_THREADS`, `APL_SEED`, `APL_TICKS` and `APL_TIMELOG` from the
    /// process environment on top of `self`.
    pub fn with_env_overrides(self) -> AplResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.  Unset keys leave the
    /// existing value untouched; a `0` tick budget means "run until stopped".
    pub fn with_overrides<F>(mut self, lookup: F) -> AplResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_THREADS) {
            self.num_threads = Some(parse_var(ENV_THREADS, &raw)?);
        }
        if let Some(raw) = lookup(ENV_SEED) {
            self.seed = Some(parse_var(ENV_SEED, &raw)?);
        }
        if let Some(raw) = lookup(ENV_TICKS) {
            let ticks: u64 = parse_var(ENV_TICKS, &raw)?;
            self.total_ticks = (ticks > 0).then_some(ticks);
        }
        if let Some(path) = lookup(ENV_TIMELOG) {
            self.time_log = Some(PathBuf::from(path));
        }
        self.validate()?;
        Ok(self)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> AplResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| AplError::Parse(format!("{key}={raw:?} is not a valid number")))
}
