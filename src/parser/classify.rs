//! Line classification
//!
//! Each line is classified on its own, apart from one running fact: whether
//! it sits inside a fenced code block. The fence check comes before every
//! other rule, and nothing inside a fence is ever a heading or a task.

use std::sync::LazyLock;

use regex::Regex;

use super::patterns::compile_regex;
use super::symbols::is_valid_status_char;

static HEADING_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile_regex(r"^(#{1,6})\s+(.+)$"));

static TASK_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile_regex(r"^(\s*)([-*+]|\d+[.)])\s+\[(.)\](?:\s+(.*))?$")
});

const FENCE_BACKTICKS: &str = "```";
const FENCE_TILDES: &str = "~~~";

/// A line that matched the task grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLine<'a> {
    /// Count of leading whitespace characters
    pub indent: usize,
    /// `-`, `*`, `+`, `1.` or `1)`
    pub marker: &'a str,
    pub status: char,
    /// Everything after the closing bracket, untrimmed at the end
    pub content: &'a str,
}

/// What a single line is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Opens or closes a fenced code block
    FenceToggle,
    Heading { level: usize, text: &'a str },
    Task(TaskLine<'a>),
    Text,
}

/// Returns true if the line opens or closes a fenced code block
pub fn is_fence(line: &str) -> bool {
    let t = line.trim();
    t.starts_with(FENCE_BACKTICKS) || t.starts_with(FENCE_TILDES)
}

/// Matches a heading line, returning its level and trimmed text
pub fn heading(line: &str) -> Option<(usize, &str)> {
    let caps = HEADING_RE.as_ref()?.captures(line)?;
    let level = caps.get(1)?.as_str().len();
    let text = caps.get(2)?.as_str().trim();
    if text.is_empty() {
        return None;
    }
    Some((level, text))
}

/// Matches the task grammar and validates the status character
pub fn task_line(line: &str) -> Option<TaskLine<'_>> {
    let caps = TASK_RE.as_ref()?.captures(line)?;

    let status = caps.get(3)?.as_str().chars().next()?;
    if !is_valid_status_char(status) {
        return None;
    }

    Some(TaskLine {
        indent: caps.get(1).map_or(0, |m| m.as_str().chars().count()),
        marker: caps.get(2)?.as_str(),
        status,
        content: caps.get(4).map_or("", |m| m.as_str()),
    })
}

/// Classifies lines in order, tracking fenced code blocks
#[derive(Debug, Default)]
pub struct LineClassifier {
    in_fence: bool,
}

impl LineClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while inside a fenced code block
    pub fn in_fence(&self) -> bool {
        self.in_fence
    }

    /// Classifies the next line
    pub fn classify<'a>(&mut self, line: &'a str) -> LineKind<'a> {
        if is_fence(line) {
            self.in_fence = !self.in_fence;
            return LineKind::FenceToggle;
        }

        if self.in_fence {
            return LineKind::Text;
        }

        if let Some((level, text)) = heading(line) {
            return LineKind::Heading { level, text };
        }

        match task_line(line) {
            Some(task) => LineKind::Task(task),
            None => LineKind::Text,
        }
    }
}

/// Enclosing headings of the current line, outermost first
#[derive(Debug, Default)]
pub struct HeadingStack {
    entries: Vec<(usize, String)>,
}

impl HeadingStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a heading after popping every heading at the same or a deeper level
    pub fn push(&mut self, level: usize, text: &str) {
        while self.entries.last().is_some_and(|(l, _)| *l >= level) {
            self.entries.pop();
        }
        self.entries.push((level, text.to_string()));
    }

    /// Heading texts, outermost first
    pub fn chain(&self) -> Vec<String> {
        self.entries.iter().map(|(_, t)| t.clone()).collect()
    }
}
