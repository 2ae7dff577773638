//! # Tasklist
//!
//! A personal task list for the terminal. Create, edit, complete, filter,
//! sort and delete tasks; everything is kept in a single JSON file.
//!
//! ## Features
//!
//! *   **Priorities**: low, medium, high and urgent.
//! *   **Due dates**: overdue and due-soon tasks are highlighted.
//! *   **Filtering and sorting**: by status and priority; by creation time,
//!     priority, due date or title.
//! *   **Dual Interface**:
//!     *   **CLI**: Scriptable and quick for single commands.
//!     *   **TUI**: Interactive list with an add/edit form.
//!
//! ## Usage
//!
//! ### Interactive Mode (TUI)
//!
//! ```bash
//! tasklist
//! # or explicitly
//! tasklist ui
//! ```
//!
//! #### TUI Key Bindings
//!
//! *   `q`: Quit
//! *   `j`/`k`: Move selection
//! *   `a`: Add new task
//! *   `e` / `Enter`: Edit selected task
//! *   `Space`: Toggle done
//! *   `d`: Delete selected task (asks first)
//! *   `C`: Clear completed tasks (asks first)
//! *   `s` / `p` / `o`: Cycle status filter / priority filter / sort order
//!
//! ### Command Line Interface (CLI)
//!
//! ```bash
//! tasklist add "Write report" -d "Q3 numbers" --due 2025-12-01 -p high
//! tasklist list --status pending --sort duedate
//! tasklist toggle <ID>
//! tasklist edit <ID> --title "Write the report" --no-due
//! tasklist clear-completed
//! ```
//!
//! ## Data Storage
//!
//! Tasks are saved as `todoTasks.json` in your local data directory:
//! *   Linux: `~/.local/share/tasklist/`
//! *   macOS: `~/Library/Application Support/tasklist/`
//! *   Windows: `%LOCALAPPDATA%\tasklist\`
//!
//! Override it with `--data-dir` or the `TASKLIST_DIR` environment variable.
//! Due dates are stored in UTC and entered/shown in local time.

pub mod commands;
pub mod config;
pub mod due;
pub mod logging;
pub mod models;
pub mod query;
pub mod storage;
pub mod store;
pub mod tui;

pub use models::{Priority, Task, TaskDraft};
pub use query::{view, Filter, PriorityFilter, SortKey, StatusFilter};
pub use storage::{FileStorage, MemoryStorage, Persistence};
pub use store::{Stats, StoreError, TaskStore};
