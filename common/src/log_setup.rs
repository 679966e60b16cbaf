use std::sync::OnceLock;

use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};

static LOG_HANDLE: OnceLock<LoggerHandle> = OnceLock::new();

/// Starts the global logger: `logs/` directory with size-based rotation,
/// everything duplicated to stdout and warnings to stderr.
///
/// `base_level` is a `log` spec string such as `"info"` or `"confocal=debug"`.
pub fn setup_logging(base_level: &str) {
    let handle = Logger::try_with_str(base_level)
        .unwrap_or_else(|e| panic!("Logger initialization failed with {}", e))
        .log_to_file(FileSpec::default().directory("logs"))
        .duplicate_to_stderr(Duplicate::Warn)
        .duplicate_to_stdout(Duplicate::All)
        .rotate(
            Criterion::Size(1024 * 1024), //1MB
            Naming::Timestamps,
            Cleanup::KeepLogFiles(5),
        )
        .start()
        .unwrap_or_else(|e| panic!("Logger initialization failed with {}", e));

    if LOG_HANDLE.set(handle).is_err() {
        panic!("Logging already initialized");
    }
}
