//! CSV time log backend.
//!
//! Header: `tick,started_unix_ms,finished_unix_ms,tick_duration_ms,agents,actions`

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;

use crate::writer::TimeLogWriter;
use crate::{OutputResult, TickTimeRow};

pub const HEADER: [&str; 6] = [
    "tick",
    "started_unix_ms",
    "finished_unix_ms",
    "tick_duration_ms",
    "agents",
    "actions",
];

/// Writes one CSV record per tick to any [`Write`] sink.
pub struct CsvTimeLog<W: Write = File> {
    inner:    Writer<W>,
    finished: bool,
}

impl CsvTimeLog<File> {
    /// Create (or truncate) the file at `path` and write the header row.
    pub fn create(path: &Path) -> OutputResult<Self> {
        Self::from_writer(File::create(path)?)
    }
}

impl<W: Write> CsvTimeLog<W> {
    pub fn from_writer(sink: W) -> OutputResult<Self> {
        let mut inner = Writer::from_writer(sink);
        inner.write_record(HEADER)?;
        Ok(Self { inner, finished: false })
    }

    /// Flush and unwrap the underlying sink.
    pub fn into_inner(mut self) -> OutputResult<W> {
        self.inner.flush()?;
        self.inner.into_inner().map_err(|e| e.into_error().into())
    }
}

impl<W: Write> TimeLogWriter for CsvTimeLog<W> {
    fn write_tick(&mut self, row: &TickTimeRow) -> OutputResult<()> {
        self.inner.write_record(&[
            row.tick.to_string(),
            row.started_unix_ms.to_string(),
            row.finished_unix_ms.to_string(),
            row.tick_duration_ms.to_string(),
            row.agents.to_string(),
            row.actions.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.inner.flush()?;
        Ok(())
    }
}
