use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Read, Write};
use std::path::PathBuf;

use log::{debug, warn};
use tempfile::NamedTempFile;

use crate::models::Task;

/// Namespace key under which the task list is stored.
pub const TASKS_KEY: &str = "todoTasks";

/// A key-value blob store.
///
/// `set` replaces the whole value for the key.
pub trait Persistence {
    /// Returns the stored value, or `None` if nothing is stored under `key`.
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    /// Stores `value` under `key`. Either the new value is fully stored or
    /// the previous one is left untouched.
    fn set(&mut self, key: &str, value: &str) -> io::Result<()>;
}

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a temp file in the same directory which is then renamed
/// over the target.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStorage { dir: dir.into() }
    }

    /// Returns the path backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Persistence for FileStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let mut f = OpenOptions::new().read(true).open(&path)?;
        let mut s = String::new();
        f.read_to_string(&mut s)?;
        Ok(Some(s))
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        let path = self.path_for(key);
        let mut temp_file = NamedTempFile::new_in(&self.dir)?;
        temp_file.write_all(value.as_bytes())?;
        temp_file.as_file().sync_all()?;
        temp_file.persist(&path).map_err(|e| e.error)?;
        debug!("wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

/// In-memory backend, mostly for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw value, bypassing serialization.
    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl Persistence for MemoryStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Loads all tasks from the backend.
///
/// Returns an empty vector if nothing is stored, the value cannot be read,
/// or it does not parse.
pub fn load_tasks<P: Persistence + ?Sized>(backend: &P) -> Vec<Task> {
    let raw = match backend.get(TASKS_KEY) {
        Ok(Some(s)) => s,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("failed to read stored tasks, starting empty: {}", e);
            return Vec::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(tasks) => tasks,
        Err(e) => {
            warn!("stored tasks do not parse, starting empty: {}", e);
            Vec::new()
        }
    }
}

/// Saves the given list of tasks, overwriting the stored value.
pub fn save_tasks<P: Persistence + ?Sized>(backend: &mut P, tasks: &[Task]) -> io::Result<()> {
    let s = serde_json::to_string_pretty(tasks)?;
    backend.set(TASKS_KEY, &s)
}
