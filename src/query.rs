//! Filtered, sorted views over the task list.
//!
//! Everything here is a pure function of its inputs; the stored list is
//! never reordered.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use clap::builder::PossibleValue;
use clap::ValueEnum;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::{Priority, Task};

/// Which completion states are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    #[value(alias = "done")]
    Completed,
}

/// Which priority is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

/// A task is visible when it passes both halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Filter {
    pub status: StatusFilter,
    pub priority: PriorityFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortKey {
    /// Newest first.
    #[default]
    Created,
    /// Most important first, newest first within a priority.
    Priority,
    /// Earliest deadline first, undated tasks last.
    #[value(name = "duedate", alias = "due")]
    DueDate,
    /// Alphabetical by title.
    Title,
}

impl StatusFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => !task.completed,
            StatusFilter::Completed => task.completed,
        }
    }

    pub fn next(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Pending,
            StatusFilter::Pending => StatusFilter::Completed,
            StatusFilter::Completed => StatusFilter::All,
        }
    }
}

impl PriorityFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Only(p) => task.priority == p,
        }
    }

    pub fn next(self) -> Self {
        match self {
            PriorityFilter::All => PriorityFilter::Only(Priority::Low),
            PriorityFilter::Only(Priority::Low) => PriorityFilter::Only(Priority::Medium),
            PriorityFilter::Only(Priority::Medium) => PriorityFilter::Only(Priority::High),
            PriorityFilter::Only(Priority::High) => PriorityFilter::Only(Priority::Urgent),
            PriorityFilter::Only(Priority::Urgent) => PriorityFilter::All,
        }
    }
}

impl Filter {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.matches(task) && self.priority.matches(task)
    }
}

impl SortKey {
    pub fn next(self) -> Self {
        match self {
            SortKey::Created => SortKey::Priority,
            SortKey::Priority => SortKey::DueDate,
            SortKey::DueDate => SortKey::Title,
            SortKey::Title => SortKey::Created,
        }
    }

    /// Orders two tasks under this key.
    pub fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortKey::Created => b.created_at.cmp(&a.created_at),
            SortKey::Priority => b
                .priority
                .cmp(&a.priority)
                .then_with(|| b.created_at.cmp(&a.created_at)),
            SortKey::DueDate => match (a.due_date, b.due_date) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(&b),
            },
            SortKey::Title => compare_titles(&a.title, &b.title),
        }
    }
}

/// Compares titles the way a reader expects: accents and case are ignored
/// first ("Éclair" files under E), then the raw text breaks ties so the
/// order stays total.
fn compare_titles(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(collation_key(b))
        .then_with(|| a.cmp(b))
}

fn collation_key(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

/// Returns the tasks passing `filter`, ordered by `sort`.
///
/// The sort is stable and works on a new vector of references.
pub fn view<'a>(tasks: &'a [Task], filter: &Filter, sort: SortKey) -> Vec<&'a Task> {
    let mut out: Vec<&Task> = tasks.iter().filter(|t| filter.matches(t)).collect();
    out.sort_by(|a, b| sort.compare(a, b));
    out
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatusFilter::All => "all",
            StatusFilter::Pending => "pending",
            StatusFilter::Completed => "completed",
        })
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "pending" => Ok(StatusFilter::Pending),
            "completed" | "done" => Ok(StatusFilter::Completed),
            other => Err(format!("unknown status '{}'. Use all, pending or completed.", other)),
        }
    }
}

impl ValueEnum for PriorityFilter {
    fn value_variants<'a>() -> &'a [Self] {
        &[
            PriorityFilter::All,
            PriorityFilter::Only(Priority::Low),
            PriorityFilter::Only(Priority::Medium),
            PriorityFilter::Only(Priority::High),
            PriorityFilter::Only(Priority::Urgent),
        ]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(match self {
            PriorityFilter::All => PossibleValue::new("all"),
            PriorityFilter::Only(Priority::Low) => PossibleValue::new("0").alias("low"),
            PriorityFilter::Only(Priority::Medium) => PossibleValue::new("1").alias("medium"),
            PriorityFilter::Only(Priority::High) => PossibleValue::new("2").alias("high"),
            PriorityFilter::Only(Priority::Urgent) => PossibleValue::new("3").alias("urgent"),
        })
    }
}

impl fmt::Display for PriorityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityFilter::All => f.write_str("all"),
            PriorityFilter::Only(p) => write!(f, "{}", p),
        }
    }
}

impl FromStr for PriorityFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(PriorityFilter::All);
        }
        s.parse::<Priority>().map(PriorityFilter::Only)
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortKey::Created => "created",
            SortKey::Priority => "priority",
            SortKey::DueDate => "dueDate",
            SortKey::Title => "title",
        })
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "created" => Ok(SortKey::Created),
            "priority" => Ok(SortKey::Priority),
            "duedate" | "due" => Ok(SortKey::DueDate),
            "title" => Ok(SortKey::Title),
            other => Err(format!(
                "unknown sort key '{}'. Use created, priority, duedate or title.",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn task(id: &str, created_at: DateTime<Utc>) -> Task {
        Task {
            id: id.into(),
            title: id.into(),
            description: String::new(),
            due_date: None,
            priority: Priority::Medium,
            completed: false,
            created_at,
        }
    }

    fn ids(view: &[&Task]) -> Vec<String> {
        view.iter().map(|t| t.id.clone()).collect()
    }

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_created_is_newest_first() {
        let tasks = vec![
            task("old", base()),
            task("new", base() + Duration::hours(2)),
            task("mid", base() + Duration::hours(1)),
        ];
        let out = view(&tasks, &Filter::default(), SortKey::Created);
        assert_eq!(ids(&out), ["new", "mid", "old"]);
    }

    #[test]
    fn test_priority_ties_break_on_created() {
        let mut a = task("a", base());
        a.priority = Priority::High;
        let mut b = task("b", base() + Duration::hours(1));
        b.priority = Priority::High;
        let mut c = task("c", base() + Duration::hours(5));
        c.priority = Priority::Low;
        let mut d = task("d", base());
        d.priority = Priority::Urgent;
        let tasks = vec![a, b, c, d];
        let out = view(&tasks, &Filter::default(), SortKey::Priority);
        assert_eq!(ids(&out), ["d", "b", "a", "c"]);
    }

    #[test]
    fn test_due_date_undated_last() {
        let a = task("A", base());
        let mut b = task("B", base());
        b.due_date = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let mut c = task("C", base());
        c.due_date = Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        let tasks = vec![a, b, c];
        let out = view(&tasks, &Filter::default(), SortKey::DueDate);
        assert_eq!(ids(&out), ["B", "C", "A"]);
    }

    #[test]
    fn test_due_date_undated_keep_relative_order() {
        let tasks = vec![task("x", base()), task("y", base()), task("z", base())];
        let out = view(&tasks, &Filter::default(), SortKey::DueDate);
        assert_eq!(ids(&out), ["x", "y", "z"]);
    }

    #[test]
    fn test_title_ignores_case() {
        let mut tasks = vec![task("1", base()), task("2", base()), task("3", base())];
        tasks[0].title = "banana".into();
        tasks[1].title = "Apple".into();
        tasks[2].title = "cherry".into();
        let out = view(&tasks, &Filter::default(), SortKey::Title);
        assert_eq!(ids(&out), ["2", "1", "3"]);
    }

    #[test]
    fn test_title_ignores_accents() {
        let mut tasks = vec![task("z", base()), task("e", base()), task("d", base()), task("f", base())];
        tasks[0].title = "Zebra".into();
        tasks[1].title = "Éclair".into();
        tasks[2].title = "Dog".into();
        tasks[3].title = "Fish".into();
        let out = view(&tasks, &Filter::default(), SortKey::Title);
        assert_eq!(ids(&out), ["d", "e", "f", "z"]);
    }

    #[test]
    fn test_title_accent_breaks_ties_only() {
        assert_eq!(compare_titles("resume", "résumé"), Ordering::Less);
        assert_eq!(compare_titles("résumé", "rez"), Ordering::Less);
    }

    #[test]
    fn test_status_pending() {
        let mut tasks = vec![task("c1", base()), task("p", base()), task("c2", base())];
        tasks[0].completed = true;
        tasks[2].completed = true;
        let filter = Filter { status: StatusFilter::Pending, ..Filter::default() };
        let out = view(&tasks, &filter, SortKey::Created);
        assert_eq!(ids(&out), ["p"]);
    }

    #[test]
    fn test_filters_combine() {
        let mut tasks = vec![task("a", base()), task("b", base()), task("c", base())];
        tasks[0].priority = Priority::Urgent;
        tasks[1].priority = Priority::Urgent;
        tasks[1].completed = true;
        let filter = Filter {
            status: StatusFilter::Completed,
            priority: PriorityFilter::Only(Priority::Urgent),
        };
        assert_eq!(ids(&view(&tasks, &filter, SortKey::Created)), ["b"]);
    }

    #[test]
    fn test_view_leaves_input_alone() {
        let tasks = vec![task("old", base()), task("new", base() + Duration::days(1))];
        let before = tasks.clone();
        let _ = view(&tasks, &Filter::default(), SortKey::Created);
        assert_eq!(tasks, before);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("dueDate".parse::<SortKey>().unwrap(), SortKey::DueDate);
        assert_eq!("all".parse::<PriorityFilter>().unwrap(), PriorityFilter::All);
        assert_eq!("3".parse::<PriorityFilter>().unwrap(), PriorityFilter::Only(Priority::Urgent));
        assert_eq!("Pending".parse::<StatusFilter>().unwrap(), StatusFilter::Pending);
        assert!("soon".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_value_enum_names() {
        assert_eq!(<SortKey as ValueEnum>::from_str("duedate", true).unwrap(), SortKey::DueDate);
        assert_eq!(<SortKey as ValueEnum>::from_str("due", true).unwrap(), SortKey::DueDate);
        assert_eq!(<StatusFilter as ValueEnum>::from_str("completed", true).unwrap(), StatusFilter::Completed);
        assert_eq!(
            <PriorityFilter as ValueEnum>::from_str("high", true).unwrap(),
            PriorityFilter::Only(Priority::High)
        );
        let names: Vec<String> = PriorityFilter::value_variants()
            .iter()
            .filter_map(|v| v.to_possible_value())
            .map(|v| v.get_name().to_string())
            .collect();
        assert_eq!(names, ["all", "0", "1", "2", "3"]);
    }

    #[test]
    fn test_cycles_wrap() {
        let mut p = PriorityFilter::All;
        for _ in 0..5 {
            p = p.next();
        }
        assert_eq!(p, PriorityFilter::All);
        assert_eq!(SortKey::Title.next(), SortKey::Created);
        assert_eq!(StatusFilter::Completed.next(), StatusFilter::All);
    }
}
