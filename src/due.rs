use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::models::Task;

const MS_PER_DAY: f64 = 86_400_000.0;

/// How close a task's deadline is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueState {
    Overdue,
    /// Due within the next day.
    DueSoon,
    Upcoming,
}

/// Whole days until `due`, rounded up. Negative once the deadline has passed
/// by at least a full day.
pub fn days_until(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let ms = (due - now).num_milliseconds() as f64;
    (ms / MS_PER_DAY).ceil() as i64
}

/// Classifies the task's deadline relative to `now`.
///
/// Returns `None` if the task has no due date.
pub fn due_state(task: &Task, now: DateTime<Utc>) -> Option<DueState> {
    let due = task.due_date?;
    let days = days_until(due, now);
    Some(if days < 0 {
        DueState::Overdue
    } else if days <= 1 {
        DueState::DueSoon
    } else {
        DueState::Upcoming
    })
}

/// Parses a due date typed by the user, interpreted in local time.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM` and `YYYY-MM-DDTHH:MM`. A bare
/// date means midnight.
pub fn parse_due(input: &str) -> Result<DateTime<Utc>, String> {
    let input = input.trim();
    let naive = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| format!("Invalid due date '{}'. Use YYYY-MM-DD or YYYY-MM-DD HH:MM.", input))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("'{}' does not exist in the local timezone.", input))
}

/// Formats a due date for display in local time.
pub fn format_due(due: DateTime<Utc>) -> String {
    due.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Formats a due date for an input field so that `parse_due` reads it back.
pub fn format_due_input(due: Option<DateTime<Utc>>) -> String {
    due.map(format_due).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use chrono::Duration;

    fn due_in(now: DateTime<Utc>, offset: Duration) -> Task {
        Task {
            id: "t".into(),
            title: "t".into(),
            description: String::new(),
            due_date: Some(now + offset),
            priority: Priority::Medium,
            completed: false,
            created_at: now,
        }
    }

    #[test]
    fn test_due_state_boundaries() {
        let now = Utc::now();
        assert_eq!(due_state(&due_in(now, Duration::days(-2)), now), Some(DueState::Overdue));
        assert_eq!(due_state(&due_in(now, Duration::hours(-3)), now), Some(DueState::DueSoon));
        assert_eq!(due_state(&due_in(now, Duration::hours(20)), now), Some(DueState::DueSoon));
        assert_eq!(due_state(&due_in(now, Duration::hours(30)), now), Some(DueState::Upcoming));
    }

    #[test]
    fn test_no_due_date() {
        let now = Utc::now();
        let mut task = due_in(now, Duration::days(1));
        task.due_date = None;
        assert_eq!(due_state(&task, now), None);
    }

    #[test]
    fn test_parse_due_round_trips_through_input_format() {
        let parsed = parse_due("2025-12-01 09:30").unwrap();
        assert_eq!(format_due_input(Some(parsed)), "2025-12-01 09:30");
        assert_eq!(parse_due("2025-12-01T09:30").unwrap(), parsed);
    }

    #[test]
    fn test_parse_due_bare_date_is_midnight() {
        let parsed = parse_due("2024-06-01").unwrap();
        assert_eq!(format_due(parsed), "2024-06-01 00:00");
    }

    #[test]
    fn test_parse_due_rejects_garbage() {
        assert!(parse_due("tomorrow").is_err());
        assert!(parse_due("2024-13-01").is_err());
    }
}
