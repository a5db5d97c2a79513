use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Builds the level filter. With `debug` off the level is forced to `info`
/// so a stray `RUST_LOG` in the user's environment does not flood output;
/// with `debug` on, `RUST_LOG` may override the `debug` default.
pub fn env_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    }
}

/// Initialise logging to stderr, or to `file` through a background writer.
/// Only the first call installs a subscriber; it returns whether it did.
pub fn init(debug: bool, file: Option<PathBuf>) -> bool {
    let filter = env_filter(debug);
    let Some(path) = file else {
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .is_ok();
    };

    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let Some(file_name) = path.file_name() else {
        eprintln!("invalid log file path {}", path.display());
        return false;
    };
    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .is_ok();
    if installed {
        let _ = FILE_GUARD.set(guard);
    }
    installed
}
