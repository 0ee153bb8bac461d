//! Deterministic task IDs
//!
//! ID Format: `t-{7-char-hash}-{line}` (e.g., `t-9d3e5f2-14`)
//!
//! The hash is derived from the file path only, so a task keeps its ID
//! across re-parses as long as it stays on the same line of the same file.
//! Two files with identical content still produce different IDs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid task ID format: expected 't-{{7-char-hash}}-{{line}}', got '{0}'")]
    InvalidTaskId(String),

    #[error("Invalid line number: {0}")]
    InvalidLine(String),
}

/// Generates a 7-character hash from a file path
fn generate_hash(file_path: &str) -> String {
    let hash = blake3::hash(file_path.as_bytes());
    let hex = hash.to_hex();
    hex[..7].to_string()
}

/// Task ID derived from `(file path, 0-based line number)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId {
    /// Hash of the source file path
    hash: String,
    /// 0-based line index in the source file
    line: usize,
}

impl TaskId {
    /// Creates the ID for the task at `line` of `file_path`
    pub fn new(file_path: &str, line: usize) -> Self {
        Self {
            hash: generate_hash(file_path),
            line,
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t-{}-{}", self.hash, self.line)
    }
}

impl FromStr for TaskId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let rest = s
            .strip_prefix("t-")
            .ok_or_else(|| IdError::InvalidTaskId(s.to_string()))?;

        let (hash, line) = rest
            .split_once('-')
            .ok_or_else(|| IdError::InvalidTaskId(s.to_string()))?;

        if hash.len() != 7 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IdError::InvalidTaskId(s.to_string()));
        }

        let line = line
            .parse::<usize>()
            .map_err(|_| IdError::InvalidLine(line.to_string()))?;

        Ok(Self {
            hash: hash.to_string(),
            line,
        })
    }
}

impl TryFrom<String> for TaskId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_path_and_line_give_same_id() {
        let a = TaskId::new("notes/today.md", 3);
        let b = TaskId::new("notes/today.md", 3);

        assert_eq!(a, b);
    }

    #[test]
    fn different_lines_give_different_ids() {
        let a = TaskId::new("notes/today.md", 3);
        let b = TaskId::new("notes/today.md", 4);

        assert_ne!(a, b);
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn different_files_give_different_ids() {
        let a = TaskId::new("a.md", 0);
        let b = TaskId::new("b.md", 0);

        assert_ne!(a, b);
    }

    #[test]
    fn id_format_is_correct() {
        let id = TaskId::new("a.md", 12);
        let s = id.to_string();

        assert!(s.starts_with("t-"));
        assert!(s.ends_with("-12"));
        assert_eq!(s.len(), "t-".len() + 7 + "-12".len());
    }

    #[test]
    fn id_parses_correctly() {
        let original = TaskId::new("projects/home.md", 42);
        let parsed: TaskId = original.to_string().parse().unwrap();

        assert_eq!(original, parsed);
        assert_eq!(parsed.line, 42);
        assert_eq!(parsed.hash, generate_hash("projects/home.md"));
    }

    #[test]
    fn id_rejects_invalid_format() {
        assert!("invalid".parse::<TaskId>().is_err());
        assert!("t-1234567".parse::<TaskId>().is_err()); // no line
        assert!("t-123456-1".parse::<TaskId>().is_err()); // hash too short
        assert!("t-gggggg1-1".parse::<TaskId>().is_err()); // 'g' is not hex
        assert_eq!(
            "t-1234567-abc".parse::<TaskId>(),
            Err(IdError::InvalidLine("abc".to_string()))
        );
    }

    #[test]
    fn serde_roundtrip_task_id() {
        let original = TaskId::new("a.md", 7);
        let json = serde_json::to_string(&original).unwrap();
        let parsed: TaskId = serde_json::from_str(&json).unwrap();

        assert_eq!(original, parsed);
    }
}
