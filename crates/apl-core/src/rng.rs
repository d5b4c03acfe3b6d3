//! Deterministic scheduler RNG.
//!
//! # Determinism strategy
//!
//! The tick executor owns one `SimRng` seeded from `EngineConfig::seed`.  At
//! every tick it first sorts the scheduled runnables by `AgentId`, then
//! shuffles them with this RNG.  Because the input order is canonical and the
//! RNG state advances exactly once per tick, two runs with the same seed and
//! the same scheduling history submit agents in the same order.
//!
//! Submission order is the only thing the shuffle affects: agents run in
//! parallel within a tick, so it never changes per-agent correctness.

use rand::rngs::SmallRng;
use rand::SeedableRng;

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG.
///
/// Used only in single-threaded or explicitly synchronised contexts (the
/// executor keeps it behind a mutex).
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Shuffle a mutable slice in-place (Fisher-Yates).
    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.0);
    }
}
