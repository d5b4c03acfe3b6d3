//! Plain data row written by time log backends.

/// Wall-clock timing of one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickTimeRow {
    pub tick:              u64,
    pub started_unix_ms:   u64,
    pub finished_unix_ms:  u64,
    /// Duration measured by the executor, barrier included.
    pub tick_duration_ms:  u64,
    /// Number of agents that ran a deliberation cycle this tick.
    pub agents:            u64,
    /// Total actions produced across all agents.
    pub actions:           u64,
}
