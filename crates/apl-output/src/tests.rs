//! Unit and integration tests for apl-output.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::time::Duration;

use apl_core::{AgentId, Payload, Tick};
use apl_sim::{TickActions, TickHook};

use crate::{CsvTimeLog, OutputError, TickTimeRow, TimeLogHook, TimeLogWriter};

// ── Helpers ───────────────────────────────────────────────────────────────────

const HEADER_LINE: &str = "tick,started_unix_ms,finished_unix_ms,tick_duration_ms,agents,actions";

fn actions(per_agent: &[usize]) -> TickActions {
    per_agent
        .iter()
        .enumerate()
        .map(|(i, &n)| (AgentId(i as u32), (0..n).map(Payload::new).collect()))
        .collect::<BTreeMap<_, _>>()
}

fn fields(line: &str) -> Vec<u64> {
    line.split(',').map(|f| f.parse().expect("numeric field")).collect()
}

/// A sink whose every write fails.
struct BrokenSink;

impl Write for BrokenSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::other("disk full"))
    }
}

/// Records rows in memory and fails on demand.
#[derive(Default)]
struct MemoryLog {
    rows:     Vec<TickTimeRow>,
    finishes: usize,
    fail:     bool,
}

impl TimeLogWriter for MemoryLog {
    fn write_tick(&mut self, row: &TickTimeRow) -> crate::OutputResult<()> {
        if self.fail {
            return Err(io::Error::other(format!("row {}", row.tick)).into());
        }
        self.rows.push(*row);
        Ok(())
    }

    fn finish(&mut self) -> crate::OutputResult<()> {
        self.finishes += 1;
        Ok(())
    }
}

// ── CSV backend ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_tests {
    use super::*;

    #[test]
    fn header_is_written_on_creation() {
        let log = CsvTimeLog::from_writer(Vec::new()).unwrap();
        let out = String::from_utf8(log.into_inner().unwrap()).unwrap();
        assert_eq!(out.lines().collect::<Vec<_>>(), vec![HEADER_LINE]);
    }

    #[test]
    fn rows_follow_header_column_order() {
        let mut log = CsvTimeLog::from_writer(Vec::new()).unwrap();
        log.write_tick(&TickTimeRow {
            tick:             3,
            started_unix_ms:  1_000,
            finished_unix_ms: 1_007,
            tick_duration_ms: 6,
            agents:           2,
            actions:          5,
        })
        .unwrap();
        log.finish().unwrap();
        log.finish().unwrap();

        let out = String::from_utf8(log.into_inner().unwrap()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "3,1000,1007,6,2,5");
    }

    #[test]
    fn create_truncates_existing_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("time.csv");
        std::fs::write(&path, "stale\nstale\n").unwrap();

        let mut log = CsvTimeLog::create(&path).unwrap();
        log.finish().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().collect::<Vec<_>>(), vec![HEADER_LINE]);
    }
}

// ── Hook ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod hook_tests {
    use apl_core::EngineConfig;

    use super::*;

    #[test]
    fn one_row_per_tick_with_counts() {
        let mut hook = TimeLogHook::new(MemoryLog::default());

        hook.on_tick_start(Tick(0));
        hook.on_tick_end(Tick(0), Duration::from_millis(12), &actions(&[2, 0, 1]));
        hook.on_tick_start(Tick(1));
        hook.on_tick_end(Tick(1), Duration::from_millis(3), &actions(&[]));
        hook.on_simulation_end(Tick(2), Duration::from_millis(3));

        assert!(hook.take_error().is_none());
        let log = hook.into_writer();
        assert_eq!(log.finishes, 1);
        assert_eq!(log.rows.len(), 2);

        let first = log.rows[0];
        assert_eq!(first.tick, 0);
        assert_eq!(first.tick_duration_ms, 12);
        assert_eq!(first.agents, 3);
        assert_eq!(first.actions, 3);
        assert!(first.started_unix_ms > 0);
        assert!(first.started_unix_ms <= first.finished_unix_ms);

        assert_eq!(log.rows[1].agents, 0);
        assert_eq!(log.rows[1].actions, 0);
    }

    #[test]
    fn only_first_error_is_kept() {
        let mut hook = TimeLogHook::new(MemoryLog { fail: true, ..MemoryLog::default() });
        let errors = hook.errors();

        hook.on_tick_end(Tick(0), Duration::ZERO, &actions(&[1]));
        hook.on_tick_end(Tick(1), Duration::ZERO, &actions(&[1]));
        assert!(!errors.is_empty());

        match hook.take_error() {
            Some(OutputError::Io(e)) => assert_eq!(e.to_string(), "row 0"),
            other => panic!("expected first I/O error, got {other:?}"),
        }
        assert!(hook.take_error().is_none());
        assert!(errors.is_empty());
    }

    #[test]
    fn flush_failure_surfaces_at_simulation_end() {
        let mut hook = TimeLogHook::new(CsvTimeLog::from_writer(BrokenSink).unwrap());

        hook.on_tick_start(Tick(0));
        hook.on_tick_end(Tick(0), Duration::ZERO, &actions(&[1]));
        hook.on_simulation_end(Tick(1), Duration::ZERO);

        assert!(matches!(hook.take_error(), Some(OutputError::Io(_))));
    }

    #[test]
    fn from_config_without_path_is_none() {
        let config = EngineConfig::new(1, 1);
        assert!(TimeLogHook::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn from_config_with_path_writes_there() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("ticks.csv");
        let config = EngineConfig { time_log: Some(path.clone()), ..EngineConfig::new(1, 1) };

        let mut hook = TimeLogHook::from_config(&config).unwrap().expect("hook");
        hook.on_simulation_end(Tick(0), Duration::ZERO);

        assert!(path.exists());
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().next(), Some(HEADER_LINE));
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("missing").join("ticks.csv");
        assert!(matches!(TimeLogHook::create(&path), Err(OutputError::Io(_))));
    }
}

// ── Engine integration ────────────────────────────────────────────────────────

#[cfg(test)]
mod engine_tests {
    use apl_agent::{AgentArguments, Plan};
    use apl_core::EngineConfig;
    use apl_sim::{PlatformBuilder, SimulationEngine};

    use super::*;

    #[test]
    fn engine_run_logs_every_tick() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("ticks.csv");

        let platform = PlatformBuilder::new(EngineConfig::new(2, 4)).build().unwrap();
        for _ in 0..3 {
            platform
                .spawn(AgentArguments::new().initial_plan(Plan::new(|_| Ok(Some(Payload::new(1u8))))))
                .unwrap();
        }

        let mut engine = SimulationEngine::new(platform);
        let hook = TimeLogHook::create(&path).unwrap();
        let errors = hook.errors();
        engine.register_hook(hook);
        assert_eq!(engine.run(), Tick(4));
        assert!(errors.take().is_none());

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], HEADER_LINE);
        assert_eq!(lines.len(), 5);
        for (i, line) in lines[1..].iter().enumerate() {
            let row = fields(line);
            assert_eq!(row[0], i as u64);
            assert_eq!(row[4], 3);
            assert_eq!(row[5], 3);
        }
    }
}
