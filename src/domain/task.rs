//! Task domain model
//!
//! A task is one checkbox line of an outline, split into its display
//! content and the metadata that was written inline on it. Tasks are
//! plain output data: the parser builds them and hands them over.

use chrono::{DateTime, Local, LocalResult, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use super::context::ProjectAssignment;
use super::id::TaskId;

/// Absolute point in time; task dates are always local midnight
pub type Timestamp = DateTime<Local>;

/// Returns local midnight of `date`
///
/// When midnight falls into a DST gap the first valid instant of that
/// day is used instead; `None` only if the day has no valid instant.
pub fn local_midnight(date: NaiveDate) -> Option<Timestamp> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    match Local.from_local_datetime(&midnight) {
        LocalResult::Single(t) => Some(t),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => (1..=3)
            .filter_map(|h| date.and_hms_opt(h, 0, 0))
            .find_map(|dt| Local.from_local_datetime(&dt).earliest()),
    }
}

/// Status category of a task, derived from its raw status character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Abandoned,
    Planned,
    /// A valid status character that no category claims
    Other,
}

/// The five date fields a task can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateField {
    Start,
    Due,
    Scheduled,
    Completed,
    Created,
}

impl DateField {
    pub const ALL: [DateField; 5] = [
        DateField::Due,
        DateField::Start,
        DateField::Scheduled,
        DateField::Completed,
        DateField::Created,
    ];

    /// Returns a display label for the field
    pub fn label(&self) -> &'static str {
        match self {
            DateField::Start => "start",
            DateField::Due => "due",
            DateField::Scheduled => "scheduled",
            DateField::Completed => "completed",
            DateField::Created => "created",
        }
    }
}

/// Metadata extracted from (or inherited onto) a task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskMetadata {
    /// Free tags in order of appearance, including the leading `#`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// 5 (highest) through 1 (lowest)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<Timestamp>,

    /// Free-text recurrence rule, e.g. `every week`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<String>,

    /// Effective project: explicit on the line, else inherited
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    /// Set only when `project` came from a file-level assignment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherited_project: Option<ProjectAssignment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,

    /// Enclosing headings, outermost first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub heading: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<TaskId>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TaskId>,
}

impl TaskMetadata {
    /// Creates empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    fn date_slot(&mut self, field: DateField) -> &mut Option<Timestamp> {
        match field {
            DateField::Start => &mut self.start_date,
            DateField::Due => &mut self.due_date,
            DateField::Scheduled => &mut self.scheduled_date,
            DateField::Completed => &mut self.completed_date,
            DateField::Created => &mut self.created_date,
        }
    }

    /// Sets a date field unless it already holds a value
    ///
    /// Returns true if the value was stored.
    pub fn fill_date(&mut self, field: DateField, value: Timestamp) -> bool {
        fill(self.date_slot(field), value)
    }

    /// Sets the priority unless it already holds a value
    pub fn fill_priority(&mut self, value: u8) -> bool {
        fill(&mut self.priority, value)
    }

    /// Adds a tag, ignoring duplicates
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.tags.contains(&tag) {
            false
        } else {
            self.tags.push(tag);
            true
        }
    }

    /// Returns true if the project was authored on the task line itself
    pub fn has_explicit_project(&self) -> bool {
        self.project.is_some() && self.inherited_project.is_none()
    }
}

/// Stores `value` in `slot` if the slot is empty
pub(crate) fn fill<T>(slot: &mut Option<T>, value: T) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(value);
    true
}

/// A task parsed from one outline line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Derived from `(file_path, line)`
    pub id: TaskId,

    /// Line text with all metadata removed and whitespace collapsed
    pub content: String,

    pub file_path: String,

    /// 0-based line index in the source text
    pub line: usize,

    /// The source line, verbatim
    pub original_markdown: String,

    /// Raw status character from between the brackets
    pub status: char,

    /// Status category derived from `status`
    pub status_kind: TaskStatus,

    /// True iff `status` matches the done marker, ignoring case
    pub completed: bool,

    /// Nesting level assigned by the hierarchy builder (0 for roots)
    #[serde(default)]
    pub depth: usize,

    pub metadata: TaskMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn make_task(line: usize) -> Task {
        Task {
            id: TaskId::new("test.md", line),
            content: format!("Task {}", line),
            file_path: "test.md".to_string(),
            line,
            original_markdown: format!("- [ ] Task {}", line),
            status: ' ',
            status_kind: TaskStatus::NotStarted,
            completed: false,
            depth: 0,
            metadata: TaskMetadata::new(),
        }
    }

    #[test]
    fn local_midnight_is_start_of_day() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let ts = local_midnight(date).unwrap();

        assert_eq!(ts.date_naive(), date);
        assert_eq!(ts.day(), 31);
    }

    #[test]
    fn fill_date_never_overwrites() {
        let mut meta = TaskMetadata::new();
        let first = local_midnight(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).unwrap();
        let second = local_midnight(NaiveDate::from_ymd_opt(2024, 2, 2).unwrap()).unwrap();

        assert!(meta.fill_date(DateField::Due, first));
        assert!(!meta.fill_date(DateField::Due, second));
        assert_eq!(meta.due_date, Some(first));
        assert!(meta.start_date.is_none());
    }

    #[test]
    fn tags_keep_order_without_duplicates() {
        let mut meta = TaskMetadata::new();

        assert!(meta.add_tag("#b"));
        assert!(meta.add_tag("#a"));
        assert!(!meta.add_tag("#b"));
        assert_eq!(meta.tags, vec!["#b", "#a"]);
    }

    #[test]
    fn explicit_and_inherited_projects_differ() {
        use crate::domain::ProjectSource;

        let mut meta = TaskMetadata::new();
        meta.project = Some("Home".to_string());
        assert!(meta.has_explicit_project());

        meta.inherited_project = Some(ProjectAssignment::new(
            "Home",
            ProjectSource::PathMapping,
            true,
        ));
        assert!(!meta.has_explicit_project());
    }

    #[test]
    fn serde_roundtrip() {
        let mut task = make_task(3);
        task.metadata.add_tag("#work");
        task.metadata.priority = Some(4);
        task.metadata.due_date = local_midnight(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        task.metadata.heading = vec!["Inbox".to_string()];

        let json = serde_json::to_string(&task).unwrap();
        let parsed: Task = serde_json::from_str(&json).unwrap();

        assert_eq!(task, parsed);
    }
}
