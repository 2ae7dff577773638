use chrono::{Local, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use super::app::{App, ConfirmAction, InputMode, NoticeKind, FORM_STEPS};
use crate::commands::stats_line;
use crate::due::{due_state, format_due, DueState};
use crate::models::Priority;
use crate::storage::Persistence;

pub fn ui<P: Persistence>(f: &mut Frame, app: &mut App<P>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Table
            Constraint::Length(1), // Notice
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    let now = Utc::now();

    let rows: Vec<Row> = app
        .rows()
        .into_iter()
        .map(|t| {
            let style = if t.completed {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
            } else {
                match due_state(t, now) {
                    Some(DueState::Overdue) => Style::default().fg(Color::Red),
                    Some(DueState::DueSoon) => Style::default().fg(Color::Yellow),
                    _ => Style::default(),
                }
            };

            Row::new(vec![
                Cell::from(if t.completed { "[x]" } else { "[ ]" }),
                Cell::from(t.title.clone()),
                Cell::from(t.priority.label()).style(Style::default().fg(priority_color(t.priority))),
                Cell::from(t.due_date.map(format_due).unwrap_or_default()),
                Cell::from(t.created_at.with_timezone(&Local).format("%Y-%m-%d").to_string()),
                Cell::from(t.description.lines().next().unwrap_or_default().to_string()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Min(20),
        Constraint::Length(8),
        Constraint::Length(16),
        Constraint::Length(10),
        Constraint::Min(10),
    ];

    let title = format!(
        "Tasks | {} | status: {} | priority: {} | sort: {}",
        stats_line(&app.store.stats()),
        app.filter.status,
        app.filter.priority,
        app.sort
    );

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["", "Title", "Priority", "Due", "Created", "Description"])
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .bottom_margin(1),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, chunks[0], &mut app.state);

    if app.visible.is_empty() {
        let empty = Paragraph::new("No tasks here. Press 'a' to add one.")
            .style(Style::default().fg(Color::Gray));
        f.render_widget(empty, inset(chunks[0]));
    }

    if let Some(notice) = &app.notice {
        let color = match notice.kind {
            NoticeKind::Success => Color::Green,
            NoticeKind::Info => Color::Blue,
            NoticeKind::Error => Color::Red,
        };
        f.render_widget(
            Paragraph::new(notice.message.as_str()).style(Style::default().fg(color)),
            chunks[1],
        );
    }

    let help_text = match app.input_mode {
        InputMode::Normal => "q: Quit | a: Add | e: Edit | Space: Done | d: Del | C: Clear Done | s: Status | p: Priority | o: Sort",
        InputMode::Adding | InputMode::Editing => "Enter: Next | Esc: Cancel",
        InputMode::Confirm(_) => "y: Confirm | any other key: Cancel",
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, chunks[2]);

    match app.input_mode {
        InputMode::Adding | InputMode::Editing => {
            let area = centered_rect(60, 3, f.area());
            f.render_widget(Clear, area);

            let verb = if app.input_mode == InputMode::Adding { "Add Task" } else { "Edit Task" };
            let title = format!(
                "{} ({}/{}): {}",
                verb,
                app.form.step + 1,
                FORM_STEPS.len(),
                FORM_STEPS[app.form.step]
            );

            let input = Paragraph::new(app.input_buffer.as_str())
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().borders(Borders::ALL).title(title));

            f.render_widget(input, area);
        }
        InputMode::Confirm(action) => {
            let area = centered_rect(50, 3, f.area());
            f.render_widget(Clear, area);

            let question = match action {
                ConfirmAction::Delete => "Delete this task? [y/N]".to_string(),
                ConfirmAction::ClearCompleted => format!(
                    "Delete {} completed task(s)? [y/N]",
                    app.store.stats().completed
                ),
            };

            let prompt = Paragraph::new(question)
                .style(Style::default().fg(Color::Red))
                .block(Block::default().borders(Borders::ALL).title("Confirm"));

            f.render_widget(prompt, area);
        }
        InputMode::Normal => {}
    }
}

fn priority_color(p: Priority) -> Color {
    match p {
        Priority::Low => Color::Gray,
        Priority::Medium => Color::Blue,
        Priority::High => Color::Yellow,
        Priority::Urgent => Color::Red,
    }
}

/// The area inside a bordered table, below its header.
fn inset(r: Rect) -> Rect {
    Rect {
        x: r.x + 2,
        y: r.y + 3,
        width: r.width.saturating_sub(4),
        height: r.height.saturating_sub(4).min(1),
    }
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(r.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Length(r.height.saturating_sub(height) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
