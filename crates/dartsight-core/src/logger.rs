//! Stderr logger for the pipeline binaries.
//!
//! Lines read `[elapsed LEVEL] message`; debug and trace lines also name
//! the log target, so per-stage chatter (hough, calibration, detection)
//! stays attributable when `--verbose` is on.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let mut stderr = std::io::stderr();
        let _ = if record.level() >= Level::Debug {
            writeln!(
                stderr,
                "[{:7.3}s {:>5}] {} ({})",
                elapsed,
                record.level(),
                record.args(),
                record.target()
            )
        } else {
            writeln!(
                stderr,
                "[{:7.3}s {:>5}] {}",
                elapsed,
                record.level(),
                record.args()
            )
        };
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger with the provided level filter.
///
/// Calling this more than once is a no-op after the first successful
/// initialization.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| StderrLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}
