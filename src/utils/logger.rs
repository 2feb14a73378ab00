use colored::Colorize;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::io::Write;

/// Writes records to stderr as `TAG message`, with a colored level tag.
struct StderrLogger {
    filter: LevelFilter,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.filter
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{} {}", level_tag(record.level()), record.args());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_tag(level: Level) -> colored::ColoredString {
    match level {
        Level::Error => "ERR".red().bold(),
        Level::Warn => "WRN".yellow().bold(),
        Level::Info => "INF".green().bold(),
        Level::Debug => "DBG".bold(),
        Level::Trace => "TRC".dimmed(),
    }
}

/// Install the process logger.
///
/// `RUST_LOG` wins over the verbosity flag when it parses as a level.
/// Calling this twice keeps the first logger.
pub fn init(verbose: bool) {
    let default = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default);

    if log::set_boxed_logger(Box::new(StderrLogger { filter })).is_ok() {
        log::set_max_level(filter);
    }
}
