//! Console and per-run file logging
//!
//! Each invocation writes to its own file, `{command}_{timestamp}.log`, under
//! the log directory. File output goes through a non-blocking writer; keep
//! the returned guard alive until the process exits or buffered lines are lost.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Overrides the log directory
pub const ENV_LOG_DIR: &str = "ADVISOR_LOG_DIR";

/// HTTP stack crates that are only interesting at warn and above
const QUIET_CRATES: [&str; 5] = ["hyper", "hyper_util", "reqwest", "rustls", "h2"];

#[derive(Debug, Clone)]
pub struct LogSettings {
    pub dir: PathBuf,
    pub verbose: bool,
    /// Write a per-run log file next to console output
    pub file_enabled: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            verbose: false,
            file_enabled: true,
        }
    }
}

impl LogSettings {
    pub fn from_env(verbose: bool) -> Self {
        let mut settings = Self {
            verbose,
            ..Self::default()
        };
        if let Ok(dir) = std::env::var(ENV_LOG_DIR) {
            settings.dir = PathBuf::from(dir);
        }
        settings
    }

    /// Default directive string used when `RUST_LOG` is unset
    pub fn directives(&self) -> String {
        let level = if self.verbose { "debug" } else { "info" };
        std::iter::once(level.to_string())
            .chain(QUIET_CRATES.iter().map(|krate| format!("{krate}=warn")))
            .collect::<Vec<_>>()
            .join(",")
    }
}

pub fn log_file_name(command: &str, started: DateTime<Local>) -> String {
    format!("{}_{}.log", command, started.format("%Y-%m-%d_%H-%M-%S"))
}

/// Install the global subscriber for `command`
///
/// Returns the path of the run's log file, if any, and the writer guard.
pub fn init(settings: &LogSettings, command: &str) -> Result<(Option<PathBuf>, Option<WorkerGuard>)> {
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(settings.directives()))
    };

    let console = fmt::layer()
        .with_target(settings.verbose)
        .with_line_number(settings.verbose)
        .with_filter(filter());

    let (file, path, guard) = if settings.file_enabled {
        std::fs::create_dir_all(&settings.dir).with_context(|| {
            format!("Failed to create log directory {}", settings.dir.display())
        })?;
        let name = log_file_name(command, Local::now());
        let path = settings.dir.join(&name);
        let (writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::never(&settings.dir, &name));
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(filter());
        (Some(layer), Some(path), Some(guard))
    } else {
        (None, None, None)
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok((path, guard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_log_file_name_carries_command_and_start_time() {
        let started = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(log_file_name("energy", started), "energy_2024-03-09_07-05-01.log");
    }

    #[test]
    fn test_directives_quiet_http_stack() {
        let quiet = LogSettings::default().directives();
        assert!(quiet.starts_with("info,"));
        assert!(quiet.contains("reqwest=warn"));
        assert!(quiet.contains("hyper_util=warn"));

        let verbose = LogSettings {
            verbose: true,
            ..LogSettings::default()
        };
        assert!(verbose.directives().starts_with("debug,"));
        assert_eq!(verbose.directives().split(',').count(), 1 + QUIET_CRATES.len());
    }
}
