//! Output formatting for CLI commands

use serde::Serialize;

use crate::domain::Task;
use crate::parser::symbols::symbol_for_priority;
use crate::storage;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<storage::OutputFormat> for OutputFormat {
    fn from(format: storage::OutputFormat) -> Self {
        match format {
            storage::OutputFormat::Text => OutputFormat::Text,
            storage::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Prints a plain message (text only; JSON output stays parseable)
    pub fn message(&self, message: &str) {
        if self.format == OutputFormat::Text {
            println!("{}", message);
        }
    }

    /// Prints an error message without aborting the command
    pub fn error(&self, message: &str) {
        match self.format {
            OutputFormat::Text => eprintln!("Error: {}", message),
            OutputFormat::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "success": false,
                        "error": message
                    })
                );
            }
        }
    }

    /// Prints structured data
    pub fn data<T: Serialize>(&self, data: &T) {
        match self.format {
            OutputFormat::Text => {
                if let Ok(json) = serde_json::to_string_pretty(data) {
                    println!("{}", json);
                }
            }
            OutputFormat::Json => {
                if let Ok(json) = serde_json::to_string(data) {
                    println!("{}", json);
                }
            }
        }
    }

    /// Prints one task as an outline line (text only)
    pub fn task(&self, task: &Task) {
        if self.format == OutputFormat::Text {
            println!("{}", task_summary(task));
        }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}

/// One-line rendering: `[x] content  📅 2024-12-31 ⏫ #tag (notes.md:4)`
pub fn task_summary(task: &Task) -> String {
    let meta = &task.metadata;
    let mut line = format!(
        "{}[{}] {}",
        "  ".repeat(task.depth),
        task.status,
        task.content
    );

    let mut extras: Vec<String> = Vec::new();
    if let Some(due) = &meta.due_date {
        extras.push(format!("due:{}", due.format("%Y-%m-%d")));
    }
    if let Some(scheduled) = &meta.scheduled_date {
        extras.push(format!("scheduled:{}", scheduled.format("%Y-%m-%d")));
    }
    if let Some(symbol) = meta.priority.and_then(symbol_for_priority) {
        extras.push(symbol.to_string());
    }
    if let Some(rule) = &meta.recurrence {
        extras.push(format!("every:{}", rule));
    }
    if let Some(project) = &meta.project {
        let marker = if meta.has_explicit_project() { "" } else { "~" };
        extras.push(format!("project:{}{}", marker, project));
    }
    if let Some(context) = &meta.context {
        extras.push(format!("@{}", context));
    }
    if let Some(area) = &meta.area {
        extras.push(format!("area:{}", area));
    }
    extras.extend(meta.tags.iter().cloned());

    if !extras.is_empty() {
        line.push_str("  ");
        line.push_str(&extras.join(" "));
    }
    line.push_str(&format!(" ({}:{})", task.file_path, task.line + 1));
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::TaskParser;

    #[test]
    fn summary_includes_depth_and_metadata() {
        let tasks = TaskParser::default().parse(
            "- [ ] Parent\n  - [x] Child 📅 2024-03-01 ⏫ @desk #q1",
            "plan.md",
        );

        assert_eq!(task_summary(&tasks[0]), "[ ] Parent (plan.md:1)");
        assert_eq!(
            task_summary(&tasks[1]),
            "  [x] Child  due:2024-03-01 ⏫ @desk #q1 (plan.md:2)"
        );
    }

    #[test]
    fn storage_format_converts() {
        assert_eq!(OutputFormat::from(storage::OutputFormat::Json), OutputFormat::Json);
        assert_eq!(OutputFormat::from(storage::OutputFormat::Text), OutputFormat::Text);
    }
}
