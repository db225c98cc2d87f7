use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming a log file path.
pub const LOG_FILE_ENV: &str = "MAKUB_LOG";

/// Initialize tracing.
///
/// `RUST_LOG` overrides `default_level`. When `MAKUB_LOG` is set, logs go to
/// `{path}.{timestamp}.{pid}` so concurrent runs never share a file;
/// otherwise they go to stderr.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let Some(log_path) = std::env::var(LOG_FILE_ENV).ok() else {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_timer(fmt::time::UtcTime::rfc_3339());
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .try_init();
        return;
    };

    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let unique_path = unique_log_path(&log_path, timestamp, std::process::id());

    let Ok(file) = std::fs::File::create(&unique_path) else {
        eprintln!("Warning: Failed to create log file: {}", unique_path);
        return;
    };

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init();
}

fn unique_log_path(base: &str, timestamp: u64, pid: u32) -> String {
    format!("{}.{}.{}", base, timestamp, pid)
}
