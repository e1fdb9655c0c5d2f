//! Logging setup
//!
//! The TUI owns the terminal, so events go to a log file instead of stderr.
//! Filtering follows `CHATMOCK_LOG` (same syntax as `RUST_LOG`), default `info`.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "CHATMOCK_LOG";
const LOG_FILE: &str = "chatmock.log";

/// Install the global subscriber writing to `dir/chatmock.log`.
///
/// Keep the returned guard alive for the whole run or buffered lines are lost.
pub fn init(dir: &Path) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()?;

    Ok(guard)
}
