use chrono::Utc;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use eyre::{Result, WrapErr};

use crate::due::{due_state, format_due, parse_due, DueState};
use crate::models::{Priority, Task, TaskDraft};
use crate::query::{view, Filter, SortKey};
use crate::storage::Persistence;
use crate::store::{Stats, StoreError, TaskStore};

/// Adds a new task.
///
/// An empty title or an unparseable due date is an error and nothing is saved.
pub fn cmd_add<P: Persistence>(
    store: &mut TaskStore<P>,
    title: String,
    description: Option<String>,
    due: Option<String>,
    priority: Option<Priority>,
) -> Result<()> {
    let due_date = due.as_deref().map(parse_due).transpose().map_err(eyre::Report::msg)?;
    let draft = TaskDraft {
        title,
        description: description.unwrap_or_default(),
        due_date,
        priority: priority.unwrap_or_default(),
    };
    let task = store.create(draft).wrap_err("Task not added")?;
    println!("Task added (id = {})", task.id);
    Ok(())
}

/// Edits an existing task. Fields left as `None` keep their current value.
pub fn cmd_edit<P: Persistence>(
    store: &mut TaskStore<P>,
    id: &str,
    title: Option<String>,
    description: Option<String>,
    due: Option<String>,
    clear_due: bool,
    priority: Option<Priority>,
) -> Result<()> {
    let Some(current) = store.get(id) else {
        eprintln!("Task {} not found.", id);
        return Ok(());
    };
    let mut draft = TaskDraft::from(current);
    if let Some(t) = title {
        draft.title = t;
    }
    if let Some(d) = description {
        draft.description = d;
    }
    if clear_due {
        draft.due_date = None;
    } else if let Some(d) = due {
        draft.due_date = Some(parse_due(&d).map_err(eyre::Report::msg)?);
    }
    if let Some(p) = priority {
        draft.priority = p;
    }
    match store.update(id, draft) {
        Ok(()) => println!("Task {} updated.", id),
        Err(StoreError::NotFound(_)) => eprintln!("Task {} not found.", id),
        Err(e) => return Err(e).wrap_err("Task not updated"),
    }
    Ok(())
}

/// Flips a task between pending and completed.
pub fn cmd_toggle<P: Persistence>(store: &mut TaskStore<P>, id: &str) -> Result<()> {
    match store.toggle_complete(id) {
        Ok(true) => println!("Task {} marked as complete.", id),
        Ok(false) => println!("Task {} marked as pending.", id),
        Err(StoreError::NotFound(_)) => eprintln!("Task {} not found.", id),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Removes a task by ID. A missing ID is reported but not an error.
pub fn cmd_remove<P: Persistence>(store: &mut TaskStore<P>, id: &str) -> Result<()> {
    if store.delete(id)? {
        println!("Task {} removed.", id);
    } else {
        eprintln!("Task {} not found.", id);
    }
    Ok(())
}

/// Removes all completed tasks.
pub fn cmd_clear_completed<P: Persistence>(store: &mut TaskStore<P>) -> Result<()> {
    if store.stats().completed == 0 {
        println!("No completed tasks to clear.");
        return Ok(());
    }
    let removed = store.clear_completed()?;
    println!("Cleared {} completed task(s).", removed);
    Ok(())
}

/// Lists tasks in a formatted table.
pub fn cmd_list<P: Persistence>(store: &TaskStore<P>, filter: Filter, sort: SortKey) {
    let tasks = view(store.tasks(), &filter, sort);
    if tasks.is_empty() {
        println!("No tasks found.");
    } else {
        println!("{}", task_table(&tasks));
    }
    println!("{}", stats_line(&store.stats()));
}

/// Prints the summary counters.
pub fn cmd_stats<P: Persistence>(store: &TaskStore<P>) {
    println!("{}", stats_line(&store.stats()));
}

/// Builds the table shown by `list`.
pub fn task_table(tasks: &[&Task]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Priority").add_attribute(Attribute::Bold),
            Cell::new("Due").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Created").add_attribute(Attribute::Bold),
        ]);

    let now = Utc::now();

    for t in tasks {
        let due_color = match due_state(t, now) {
            _ if t.completed => Color::Reset,
            Some(DueState::Overdue) => Color::Red,
            Some(DueState::DueSoon) => Color::Yellow,
            _ => Color::Reset,
        };

        let status = if t.completed { "Done" } else { "Pending" };
        let status_color = if t.completed { Color::Green } else { Color::Yellow };

        let mut title = t.title.clone();
        if !t.description.is_empty() {
            title.push('\n');
            title.push_str(&t.description);
        }

        table.add_row(vec![
            Cell::new(&t.id),
            Cell::new(title),
            Cell::new(t.priority).fg(priority_color(t.priority)),
            Cell::new(t.due_date.map(format_due).unwrap_or_default()).fg(due_color),
            Cell::new(status).fg(status_color),
            Cell::new(t.created_at.with_timezone(&chrono::Local).format("%Y-%m-%d")),
        ]);
    }

    table
}

pub fn stats_line(stats: &Stats) -> String {
    format!(
        "{} total, {} pending, {} completed ({}%)",
        stats.total, stats.pending, stats.completed, stats.completion_rate
    )
}

fn priority_color(p: Priority) -> Color {
    match p {
        Priority::Low => Color::Grey,
        Priority::Medium => Color::Blue,
        Priority::High => Color::Yellow,
        Priority::Urgent => Color::Red,
    }
}
