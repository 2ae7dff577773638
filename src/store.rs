use std::io;

use chrono::Utc;
use log::{debug, info};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Task, TaskDraft};
use crate::storage::{load_tasks, save_tasks, Persistence};

/// Errors returned by [`TaskStore`] operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Input rejected before any change was made.
    #[error("{0}")]
    Validation(String),
    /// No task with the given id.
    #[error("task not found: {0}")]
    NotFound(String),
    /// Writing the task list failed.
    #[error("failed to save tasks: {0}")]
    Persistence(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Summary counters over the whole list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Percentage of completed tasks, rounded. Zero when empty.
    pub completion_rate: u32,
}

/// Owns the task list and mirrors every mutation to its backend.
///
/// Tasks are kept newest first.
pub struct TaskStore<P: Persistence> {
    backend: P,
    tasks: Vec<Task>,
}

impl<P: Persistence> TaskStore<P> {
    /// Opens a store, loading whatever the backend currently holds.
    pub fn open(backend: P) -> Self {
        let mut store = TaskStore { backend, tasks: Vec::new() };
        store.load();
        store
    }

    /// Replaces the in-memory list with the persisted one.
    pub fn load(&mut self) {
        self.tasks = load_tasks(&self.backend);
        debug!("loaded {} tasks", self.tasks.len());
    }

    /// Writes the full list to the backend.
    pub fn save(&mut self) -> StoreResult<()> {
        save_tasks(&mut self.backend, &self.tasks)?;
        Ok(())
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn backend(&self) -> &P {
        &self.backend
    }

    /// Creates a task from the draft and puts it at the front of the list.
    pub fn create(&mut self, draft: TaskDraft) -> StoreResult<Task> {
        let (title, description) = validate(&draft)?;
        let task = Task {
            id: generate_id(),
            title,
            description,
            due_date: draft.due_date,
            priority: draft.priority,
            completed: false,
            created_at: Utc::now(),
        };
        self.tasks.insert(0, task.clone());
        info!("created task {}", task.id);
        self.save()?;
        Ok(task)
    }

    /// Replaces the editable fields of an existing task.
    pub fn update(&mut self, id: &str, draft: TaskDraft) -> StoreResult<()> {
        let idx = self.position(id)?;
        let (title, description) = validate(&draft)?;
        let task = &mut self.tasks[idx];
        task.title = title;
        task.description = description;
        task.due_date = draft.due_date;
        task.priority = draft.priority;
        debug!("updated task {}", id);
        self.save()
    }

    /// Flips the completed flag and returns the new value.
    pub fn toggle_complete(&mut self, id: &str) -> StoreResult<bool> {
        let idx = self.position(id)?;
        let task = &mut self.tasks[idx];
        task.completed = !task.completed;
        let completed = task.completed;
        debug!("task {} completed = {}", id, completed);
        self.save()?;
        Ok(completed)
    }

    /// Removes the task with `id`. Returns whether anything was removed.
    ///
    /// A missing id is not an error; the list is still saved.
    pub fn delete(&mut self, id: &str) -> StoreResult<bool> {
        let len_before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() != len_before;
        if removed {
            info!("deleted task {}", id);
        }
        self.save()?;
        Ok(removed)
    }

    /// Removes every completed task and returns how many were removed.
    pub fn clear_completed(&mut self) -> StoreResult<usize> {
        let len_before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        let removed = len_before - self.tasks.len();
        info!("cleared {} completed tasks", removed);
        self.save()?;
        Ok(removed)
    }

    pub fn stats(&self) -> Stats {
        let total = self.tasks.len();
        let completed = self.tasks.iter().filter(|t| t.completed).count();
        let completion_rate = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u32
        };
        Stats {
            total,
            completed,
            pending: total - completed,
            completion_rate,
        }
    }

    fn position(&self, id: &str) -> StoreResult<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

/// Returns the trimmed title and description, or a validation error.
fn validate(draft: &TaskDraft) -> StoreResult<(String, String)> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(StoreError::Validation("task title cannot be empty".into()));
    }
    Ok((title.to_string(), draft.description.trim().to_string()))
}

fn generate_id() -> String {
    format!("task_{}", Uuid::now_v7().simple())
}
