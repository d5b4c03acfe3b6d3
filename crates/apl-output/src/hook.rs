//! `TimeLogHook<W>` — bridges `TickHook` to a `TimeLogWriter`.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use apl_core::{EngineConfig, Tick};
use apl_sim::{TickActions, TickHook};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::csv::CsvTimeLog;
use crate::writer::TimeLogWriter;
use crate::{OutputError, OutputResult, TickTimeRow};

/// Shared slot holding the first error a [`TimeLogHook`] ran into.
///
/// The engine owns its hooks once registered, so the handle is how callers
/// check for write failures after `run()` returns.
#[derive(Clone, Default)]
pub struct TimeLogErrors(Arc<Mutex<Option<OutputError>>>);

impl TimeLogErrors {
    pub fn take(&self) -> Option<OutputError> {
        self.0.lock().take()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_none()
    }

    fn store(&self, result: OutputResult<()>) {
        if let Err(e) = result {
            let mut slot = self.0.lock();
            // Keep only the first error.
            if slot.is_none() {
                warn!(error = %e, "time log write failed");
                *slot = Some(e);
            }
        }
    }
}

/// A [`TickHook`] that writes one [`TickTimeRow`] per tick.
///
/// Errors from the writer are stored because hook methods have no return
/// value.  Retrieve them with [`take_error`][Self::take_error] or, once the
/// hook has been handed to the engine, through [`errors`][Self::errors].
pub struct TimeLogHook<W: TimeLogWriter = CsvTimeLog> {
    writer:     W,
    started_ms: u64,
    errors:     TimeLogErrors,
}

impl TimeLogHook<CsvTimeLog> {
    /// Log to a CSV file at `path`.
    pub fn create(path: &Path) -> OutputResult<Self> {
        Ok(Self::new(CsvTimeLog::create(path)?))
    }

    /// `Some(hook)` when `config.time_log` names a path, `None` otherwise.
    pub fn from_config(config: &EngineConfig) -> OutputResult<Option<Self>> {
        config.time_log.as_deref().map(Self::create).transpose()
    }
}

impl<W: TimeLogWriter> TimeLogHook<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, started_ms: 0, errors: TimeLogErrors::default() }
    }

    /// Take the stored write error (if any).  `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.errors.take()
    }

    pub fn errors(&self) -> TimeLogErrors {
        self.errors.clone()
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: TimeLogWriter> TickHook for TimeLogHook<W> {
    fn on_tick_start(&mut self, _tick: Tick) {
        self.started_ms = unix_millis();
    }

    fn on_tick_end(&mut self, tick: Tick, duration: Duration, actions: &TickActions) {
        let row = TickTimeRow {
            tick:             tick.0,
            started_unix_ms:  self.started_ms,
            finished_unix_ms: unix_millis(),
            tick_duration_ms: duration.as_millis() as u64,
            agents:           actions.len() as u64,
            actions:          actions.values().map(Vec::len).sum::<usize>() as u64,
        };
        let result = self.writer.write_tick(&row);
        self.errors.store(result);
    }

    fn on_simulation_end(&mut self, last_tick: Tick, _last_duration: Duration) {
        let result = self.writer.finish();
        self.errors.store(result);
        debug!(ticks = %last_tick, "time log flushed");
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
