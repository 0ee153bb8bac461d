//! Markdown document reading
//!
//! A document may open with a YAML frontmatter block delimited by `---`
//! lines. Its scalar values become the file's [`FileMetadata`]. Frontmatter
//! that cannot be parsed is logged and treated as absent; the body is still
//! parsed.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{trace, warn};

use crate::domain::FileMetadata;

const DELIMITER: &str = "---";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Missing frontmatter end delimiter (---)")]
    UnterminatedFrontmatter,

    #[error("Failed to parse frontmatter: {0}")]
    InvalidFrontmatter(String),

    #[error("Frontmatter must be a mapping of keys to values")]
    NotAMapping,
}

/// A markdown file and its frontmatter
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub text: String,
    pub frontmatter: FileMetadata,
    /// Lines taken up by the frontmatter block, delimiters included
    frontmatter_lines: usize,
}

impl Document {
    /// Reads a document from disk
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read document: {}", path.display()))?;

        Ok(Self::from_text(path, text))
    }

    /// Builds a document from text already in memory
    pub fn from_text(path: impl Into<PathBuf>, text: String) -> Self {
        let path = path.into();

        let (frontmatter, frontmatter_lines) = match split_frontmatter(&text) {
            Ok(Some((yaml, lines))) => match parse_frontmatter(yaml) {
                Ok(meta) => (meta, lines),
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Ignoring frontmatter");
                    (FileMetadata::new(), lines)
                }
            },
            Ok(None) => (FileMetadata::new(), 0),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Ignoring frontmatter");
                (FileMetadata::new(), 0)
            }
        };

        Self {
            path,
            text,
            frontmatter,
            frontmatter_lines,
        }
    }

    /// Text handed to the parser
    ///
    /// Frontmatter lines are blanked so nothing in them is read as a task,
    /// while every body line keeps its original line index.
    pub fn task_text(&self) -> Cow<'_, str> {
        if self.frontmatter_lines == 0 {
            return Cow::Borrowed(&self.text);
        }

        let body = self
            .text
            .split_inclusive('\n')
            .skip(self.frontmatter_lines)
            .collect::<String>();
        Cow::Owned("\n".repeat(self.frontmatter_lines) + &body)
    }
}

/// Locates a leading frontmatter block
///
/// Returns the YAML between the delimiters and the number of lines the
/// block spans, or `None` if the document has no frontmatter.
pub fn split_frontmatter(text: &str) -> Result<Option<(&str, usize)>, DocumentError> {
    let mut lines = text.split_inclusive('\n');

    let yaml_start = match lines.next() {
        Some(first) if first.trim_end() == DELIMITER => first.len(),
        _ => return Ok(None),
    };
    let mut offset = yaml_start;

    for (i, line) in lines.enumerate() {
        if line.trim_end() == DELIMITER {
            return Ok(Some((&text[yaml_start..offset], i + 2)));
        }
        offset += line.len();
    }

    Err(DocumentError::UnterminatedFrontmatter)
}

/// Parses frontmatter YAML into string key/value pairs
///
/// Scalars are kept as text; nested values are skipped.
pub fn parse_frontmatter(yaml: &str) -> Result<FileMetadata, DocumentError> {
    if yaml.trim().is_empty() {
        return Ok(FileMetadata::new());
    }

    let value: serde_yaml::Value =
        serde_yaml::from_str(yaml).map_err(|e| DocumentError::InvalidFrontmatter(e.to_string()))?;

    let mapping = match value {
        serde_yaml::Value::Mapping(m) => m,
        serde_yaml::Value::Null => return Ok(FileMetadata::new()),
        _ => return Err(DocumentError::NotAMapping),
    };

    let mut meta = FileMetadata::new();
    for (key, value) in mapping {
        let Some(key) = scalar_to_string(&key) else {
            continue;
        };
        match scalar_to_string(&value) {
            Some(v) => meta.set(key, v),
            None => trace!(key = %key, "Skipping non-scalar frontmatter value"),
        }
    }
    Ok(meta)
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
