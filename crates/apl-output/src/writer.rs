//! The `TimeLogWriter` trait implemented by time log backends.

use crate::{OutputResult, TickTimeRow};

/// Sink for [`TickTimeRow`]s.
///
/// Errors are returned to the [`TimeLogHook`][crate::TimeLogHook], which
/// stores the first one for later retrieval.
pub trait TimeLogWriter {
    fn write_tick(&mut self, row: &TickTimeRow) -> OutputResult<()>;

    /// Flush buffered rows.  Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
