use chrono::{DateTime, Utc};
use log::warn;
use ratatui::widgets::TableState;

use crate::due::{format_due_input, parse_due};
use crate::models::{Priority, Task, TaskDraft};
use crate::query::{view, Filter, SortKey};
use crate::storage::Persistence;
use crate::store::{StoreError, TaskStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Adding,
    Editing,
    Confirm(ConfirmAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Delete,
    ClearCompleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Error,
}

/// Result of the last action, shown under the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Steps of the add/edit form, in order.
pub const FORM_STEPS: [&str; 4] = [
    "Title",
    "Description",
    "Due Date (YYYY-MM-DD [HH:MM], optional)",
    "Priority (0-3 or low/medium/high/urgent)",
];

/// State for the multi-step add/edit form.
#[derive(Debug, Default)]
pub struct FormState {
    pub step: usize,
    pub title: String,
    pub description: String,
    pub due: String,
    pub priority: String,
    /// Due date of the task being edited, kept exact while its text is untouched.
    pub original_due: Option<DateTime<Utc>>,
}

impl FormState {
    fn from_task(task: &Task) -> Self {
        FormState {
            step: 0,
            title: task.title.clone(),
            description: task.description.clone(),
            due: format_due_input(task.due_date),
            priority: task.priority.rank().to_string(),
            original_due: task.due_date,
        }
    }

    fn field(&self, step: usize) -> &str {
        match step {
            0 => &self.title,
            1 => &self.description,
            2 => &self.due,
            _ => &self.priority,
        }
    }

    fn field_mut(&mut self, step: usize) -> &mut String {
        match step {
            0 => &mut self.title,
            1 => &mut self.description,
            2 => &mut self.due,
            _ => &mut self.priority,
        }
    }

    fn due_date(&self) -> Result<Option<DateTime<Utc>>, String> {
        if self.due.trim() == format_due_input(self.original_due) {
            return Ok(self.original_due);
        }
        if self.due.trim().is_empty() {
            return Ok(None);
        }
        parse_due(&self.due).map(Some)
    }

    fn priority(&self) -> Result<Priority, String> {
        if self.priority.trim().is_empty() {
            return Ok(Priority::default());
        }
        self.priority.parse()
    }

    /// Validates the field entered at `step`.
    fn check(&self, step: usize) -> Result<(), String> {
        match step {
            0 if self.title.trim().is_empty() => Err("Please enter a task title".into()),
            2 => self.due_date().map(|_| ()),
            3 => self.priority().map(|_| ()),
            _ => Ok(()),
        }
    }

    /// First step whose field is invalid, with the reason.
    fn first_invalid(&self) -> Option<(usize, String)> {
        (0..FORM_STEPS.len()).find_map(|step| self.check(step).err().map(|msg| (step, msg)))
    }

    fn to_draft(&self) -> Result<TaskDraft, String> {
        Ok(TaskDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            due_date: self.due_date()?,
            priority: self.priority()?,
        })
    }
}

pub struct App<P: Persistence> {
    pub store: TaskStore<P>,
    pub filter: Filter,
    pub sort: SortKey,
    /// Ids of the rows currently on screen, in display order.
    pub visible: Vec<String>,
    pub state: TableState,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub form: FormState,
    pub target_id: Option<String>,
    pub notice: Option<Notice>,
}

impl<P: Persistence> App<P> {
    /// Creates a new App around an opened store.
    pub fn new(store: TaskStore<P>) -> App<P> {
        let mut app = App {
            store,
            filter: Filter::default(),
            sort: SortKey::default(),
            visible: Vec::new(),
            state: TableState::default(),
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            form: FormState::default(),
            target_id: None,
            notice: None,
        };
        app.refresh();
        app
    }

    /// Tasks in display order.
    pub fn rows(&self) -> Vec<&Task> {
        self.visible.iter().filter_map(|id| self.store.get(id)).collect()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.state
            .selected()
            .and_then(|i| self.visible.get(i))
            .map(String::as_str)
    }

    /// Recomputes the visible rows and keeps the selection in range.
    pub fn refresh(&mut self) {
        self.visible = view(self.store.tasks(), &self.filter, self.sort)
            .into_iter()
            .map(|t| t.id.clone())
            .collect();

        if self.visible.is_empty() {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= self.visible.len() {
                self.state.select(Some(self.visible.len() - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    /// Selects the next row, wrapping around.
    pub fn next(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.visible.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    /// Selects the previous row, wrapping around.
    pub fn previous(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.visible.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn cycle_status(&mut self) {
        self.filter.status = self.filter.status.next();
        self.refresh();
    }

    pub fn cycle_priority(&mut self) {
        self.filter.priority = self.filter.priority.next();
        self.refresh();
    }

    pub fn cycle_sort(&mut self) {
        self.sort = self.sort.next();
        self.refresh();
    }

    /// Toggles the selected task between pending and completed.
    pub fn toggle_selected(&mut self) {
        let Some(id) = self.selected_id().map(str::to_string) else {
            return;
        };
        match self.store.toggle_complete(&id) {
            Ok(true) => self.notify(NoticeKind::Success, "Task completed!"),
            Ok(false) => self.notify(NoticeKind::Success, "Task marked as pending"),
            Err(e) => self.report(e),
        }
        self.refresh();
    }

    /// Asks for confirmation before deleting the selected task.
    pub fn request_delete(&mut self) {
        if let Some(id) = self.selected_id().map(str::to_string) {
            self.target_id = Some(id);
            self.input_mode = InputMode::Confirm(ConfirmAction::Delete);
        }
    }

    /// Asks for confirmation before clearing completed tasks.
    pub fn request_clear_completed(&mut self) {
        if self.store.stats().completed == 0 {
            self.notify(NoticeKind::Info, "No completed tasks to clear");
            return;
        }
        self.input_mode = InputMode::Confirm(ConfirmAction::ClearCompleted);
    }

    /// Runs the action awaiting confirmation.
    pub fn confirm(&mut self) {
        let InputMode::Confirm(action) = self.input_mode else {
            return;
        };
        match action {
            ConfirmAction::Delete => {
                if let Some(id) = self.target_id.take() {
                    match self.store.delete(&id) {
                        Ok(_) => self.notify(NoticeKind::Success, "Task deleted"),
                        Err(e) => self.report(e),
                    }
                }
            }
            ConfirmAction::ClearCompleted => match self.store.clear_completed() {
                Ok(n) => self.notify(NoticeKind::Success, format!("Cleared {} completed task(s)", n)),
                Err(e) => self.report(e),
            },
        }
        self.input_mode = InputMode::Normal;
        self.refresh();
    }

    /// Leaves any form or confirmation without changes.
    pub fn cancel(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        self.target_id = None;
    }

    /// Opens an empty form for a new task.
    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.form = FormState::default();
        self.target_id = None;
        self.input_buffer.clear();
    }

    /// Opens the form prefilled with the selected task.
    pub fn start_edit(&mut self) {
        let Some(task) = self.selected_id().and_then(|id| self.store.get(id)).cloned() else {
            return;
        };
        self.form = FormState::from_task(&task);
        self.target_id = Some(task.id);
        self.input_buffer = self.form.title.clone();
        self.input_mode = InputMode::Editing;
    }

    /// Accepts the current form field and moves on, submitting after the last one.
    pub fn handle_input(&mut self) {
        if !matches!(self.input_mode, InputMode::Adding | InputMode::Editing) {
            return;
        }
        let step = self.form.step;
        *self.form.field_mut(step) = std::mem::take(&mut self.input_buffer);
        if let Err(msg) = self.form.check(step) {
            self.input_buffer = self.form.field(step).to_string();
            self.notify(NoticeKind::Error, msg);
            return;
        }

        if step + 1 < FORM_STEPS.len() {
            self.form.step += 1;
            self.input_buffer = self.form.field(self.form.step).to_string();
            return;
        }
        self.submit_form();
    }

    fn submit_form(&mut self) {
        if let Some((step, msg)) = self.form.first_invalid() {
            self.form.step = step;
            self.input_buffer = self.form.field(step).to_string();
            self.notify(NoticeKind::Error, msg);
            return;
        }
        let draft = match self.form.to_draft() {
            Ok(d) => d,
            Err(msg) => {
                self.notify(NoticeKind::Error, msg);
                return;
            }
        };
        let result = match self.target_id.take() {
            Some(id) => self.store.update(&id, draft).map(|_| "Task updated!"),
            None => self.store.create(draft).map(|_| "Task added!"),
        };
        match result {
            Ok(msg) => self.notify(NoticeKind::Success, msg),
            Err(e) => self.report(e),
        }
        self.input_mode = InputMode::Normal;
        self.refresh();
    }

    fn notify(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.notice = Some(Notice { kind, message: message.into() });
    }

    fn report(&mut self, err: StoreError) {
        match err {
            // The row was on screen a moment ago; nothing to tell the user.
            StoreError::NotFound(id) => warn!("task {} vanished before the action ran", id),
            other => self.notify(NoticeKind::Error, other.to_string()),
        }
    }
}
