//! Per-file context supplied by collaborators outside the parser
//!
//! Neither type here is ever produced by the parser itself. The file
//! reader supplies [`FileMetadata`] from a document's frontmatter and a
//! project resolver supplies a [`ProjectAssignment`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key/value metadata attached to a whole file (e.g. YAML frontmatter)
///
/// Only ever used to fill fields a task left absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata(BTreeMap<String, String>);

impl FileMetadata {
    /// Creates empty metadata
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Gets a value by key (keys are case-insensitive)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(&key.to_lowercase()).map(String::as_str)
    }

    /// Sets a value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into().to_lowercase(), value.into());
    }

    /// Returns true if empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over all key-value pairs
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FileMetadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut meta = Self::new();
        for (k, v) in iter {
            meta.set(k, v);
        }
        meta
    }
}

/// Where an inherited project assignment came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectSource {
    /// A configured path-prefix mapping
    PathMapping,
    /// The file's own metadata
    Metadata,
    /// A project file in an enclosing directory
    ConfigFile,
}

/// A project resolved for a whole file rather than authored on a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectAssignment {
    /// Project name
    pub name: String,
    /// Where the assignment came from
    pub source: ProjectSource,
    /// True if writing the project back onto the task line is not allowed
    pub readonly: bool,
}

impl ProjectAssignment {
    pub fn new(name: impl Into<String>, source: ProjectSource, readonly: bool) -> Self {
        Self {
            name: name.into(),
            source,
            readonly,
        }
    }
}

/// Everything a collaborator may supply alongside a document's text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseContext {
    pub file_metadata: Option<FileMetadata>,
    pub project: Option<ProjectAssignment>,
}

impl ParseContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file_metadata(mut self, meta: FileMetadata) -> Self {
        self.file_metadata = Some(meta);
        self
    }

    pub fn with_project(mut self, project: ProjectAssignment) -> Self {
        self.project = Some(project);
        self
    }
}
