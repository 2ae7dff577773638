use std::fs;
use std::path::PathBuf;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "TASKLIST_DIR";

/// Name of the log file written while the TUI owns the terminal.
pub const LOG_FILE: &str = "tasklist.log";

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
}

impl Config {
    /// Resolves the configuration.
    ///
    /// The data directory is determined in the following order:
    /// 1. The explicit `data_dir` argument (`--data-dir`).
    /// 2. `TASKLIST_DIR` environment variable.
    /// 3. `~/.local/share/tasklist` (on Linux).
    /// 4. `.` (fallback).
    pub fn resolve(data_dir: Option<PathBuf>) -> Config {
        let data_dir = data_dir
            .or_else(|| std::env::var(DATA_DIR_ENV).ok().map(PathBuf::from))
            .unwrap_or_else(default_data_dir);
        Config { data_dir }
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }

    /// Makes sure the data directory exists.
    pub fn ensure_data_dir(&self) -> std::io::Result<()> {
        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir)?;
        }
        Ok(())
    }
}

fn default_data_dir() -> PathBuf {
    match dirs::data_local_dir() {
        Some(mut p) => {
            p.push("tasklist");
            p
        }
        None => PathBuf::from("."),
    }
}
