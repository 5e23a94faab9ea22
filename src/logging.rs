//! Logging infrastructure for decodeq.
//!
//! Provides structured logging with file and console output:
//! - Writes to `<log_dir>/decodeq.log` (cleared on session start)
//! - Also prints to stdout for terminal tailing
//! - Configurable via the RUST_LOG environment variable

use std::fs;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Default log filename.
pub const LOG_FILE: &str = "decodeq.log";

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard flushes and closes the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initializes the logging system.
///
/// Creates the log directory if needed, clears the previous session's log
/// file, and sets up dual output to file and stdout. The filter defaults to
/// INFO when RUST_LOG is not set.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or the log file
/// cannot be cleared.
pub fn init_logging(log_dir: &str) -> Result<LoggingGuard, io::Error> {
    fs::create_dir_all(log_dir)?;

    // Truncate any previous session's log.
    let log_path = Path::new(log_dir).join(LOG_FILE);
    fs::write(&log_path, "")?;

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .compact();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_ansi(true)
        .compact();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_log_dir() -> PathBuf {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        PathBuf::from(format!("test_logs_{}", timestamp))
    }

    #[test]
    fn test_log_file_name() {
        assert_eq!(LOG_FILE, "decodeq.log");
    }

    #[test]
    fn test_creates_directory_and_clears_file() {
        let log_dir = test_log_dir();
        let log_dir_str = log_dir.to_str().unwrap();

        // init_logging can't be called twice per process (global subscriber),
        // so exercise the file operations it performs.
        fs::create_dir_all(log_dir_str).expect("Failed to create directory");
        let log_path = log_dir.join(LOG_FILE);
        fs::write(&log_path, "old session data").expect("Failed to write");
        fs::write(&log_path, "").expect("Failed to clear");

        assert_eq!(fs::read_to_string(&log_path).unwrap(), "");

        fs::remove_dir_all(&log_dir).expect("Failed to cleanup");
    }
}
