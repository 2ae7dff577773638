use std::fs::OpenOptions;
use std::path::Path;

use env_logger::{Builder, Env, Target};
use eyre::{Result, WrapErr};

const DEFAULT_FILTER: &str = "warn";

/// Logs to stderr, filtered by `RUST_LOG`.
pub fn init_stderr() -> Result<()> {
    builder().try_init().wrap_err("Failed to initialize logger")
}

/// Logs to `path` instead of stderr.
///
/// Used while the TUI owns the terminal.
pub fn init_file(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .wrap_err_with(|| format!("Failed to open log file {}", path.display()))?;
    builder()
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .wrap_err("Failed to initialize logger")
}

fn builder() -> Builder {
    Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER))
}
