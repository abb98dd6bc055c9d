//! Tracing subscriber for the runner
//!
//! Stdout carries the frame printout, so log lines only ever go to stderr,
//! the configured log file, or both.

use anyhow::{anyhow, Context, Result};
use dmx_control::LogConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber described by `config`
///
/// The returned guard flushes the file writer on drop and must live until
/// exit. Returns `Ok(None)` without installing anything when both outputs
/// are disabled.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let (file, guard) = if config.file_output {
        config
            .ensure_log_directory()
            .with_context(|| format!("Failed to create log directory {:?}", config.log_dir))?;
        // Appends across runs; the runner is short-lived so no rotation
        let appender = tracing_appender::rolling::never(&config.log_dir, &config.file_name);
        let (file, guard) = tracing_appender::non_blocking(appender);
        (Some(file), Some(guard))
    } else {
        (None, None)
    };

    let writer = match (config.console_output, file) {
        (true, Some(file)) => BoxMakeWriter::new(std::io::stderr.and(file)),
        (true, None) => BoxMakeWriter::new(std::io::stderr),
        (false, Some(file)) => BoxMakeWriter::new(file),
        (false, None) => return Ok(None),
    };

    // RUST_LOG overrides the configured level
    let filter = EnvFilter::builder()
        .with_default_directive(config.parse_level().into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(config.console_output && !config.file_output)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))?;

    if config.file_output {
        tracing::debug!("Appending logs to {:?}", config.current_log_path());
    }

    Ok(guard)
}
