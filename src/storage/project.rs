//! Project resolution
//!
//! Decides which project a document belongs to before it is parsed. The
//! result reaches tasks only when they carry no explicit project of their own.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::config::{Config, ProjectMapping, PROJECT_DIR};
use crate::domain::{FileMetadata, ProjectAssignment, ProjectSource};

/// Frontmatter key naming a document's project
pub const PROJECT_KEY: &str = "project";

/// Per-directory project file, relative to the directory
const PROJECT_FILE: &str = "project";

/// Resolves project assignments for documents
///
/// Order of precedence:
///
/// 1. `project` in the document's frontmatter (editable)
/// 2. the longest matching `[[project_mappings]]` path prefix (readonly)
/// 3. a `.taskmark/project` file in the document's directory or an
///    ancestor up to the project root (readonly)
#[derive(Debug, Default)]
pub struct ProjectResolver {
    root: Option<PathBuf>,
    mappings: Vec<ProjectMapping>,
    dir_cache: HashMap<PathBuf, Option<String>>,
}

impl ProjectResolver {
    pub fn new(root: Option<PathBuf>, mappings: Vec<ProjectMapping>) -> Self {
        Self {
            root,
            mappings,
            dir_cache: HashMap::new(),
        }
    }

    /// Resolver for the loaded project; the root is canonicalized so that
    /// canonical document paths strip against it
    pub fn from_config(config: &Config) -> Self {
        let root = config
            .project_root
            .as_deref()
            .map(|r| fs::canonicalize(r).unwrap_or_else(|_| r.to_path_buf()));
        Self::new(root, config.project.project_mappings.clone())
    }

    /// Resolves the project for the document at `path`
    pub fn resolve(&mut self, path: &Path, frontmatter: &FileMetadata) -> Option<ProjectAssignment> {
        if let Some(name) = frontmatter.get(PROJECT_KEY).map(str::trim).filter(|n| !n.is_empty()) {
            return Some(ProjectAssignment::new(name, ProjectSource::Metadata, false));
        }

        if let Some(mapping) = self.mapping_for(path) {
            return Some(ProjectAssignment::new(
                mapping.project.clone(),
                ProjectSource::PathMapping,
                true,
            ));
        }

        self.project_file_for(path)
            .map(|name| ProjectAssignment::new(name, ProjectSource::ConfigFile, true))
    }

    /// Longest mapping whose path is a prefix of `path`, compared by component
    fn mapping_for(&self, path: &Path) -> Option<&ProjectMapping> {
        let relative = self.relative(path);

        self.mappings
            .iter()
            .filter(|m| relative.starts_with(Path::new(m.path.trim())))
            .max_by_key(|m| Path::new(m.path.trim()).components().count())
    }

    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        self.root
            .as_deref()
            .and_then(|root| path.strip_prefix(root).ok())
            .unwrap_or(path)
    }

    /// Nearest `.taskmark/project` file, not walking above the project root
    fn project_file_for(&mut self, path: &Path) -> Option<String> {
        let mut dir = path.parent()?.to_path_buf();

        loop {
            if let Some(found) = self.read_project_file(&dir) {
                return Some(found);
            }

            let at_root = self.root.as_deref().is_some_and(|root| dir == root);
            if at_root || !dir.pop() || dir.as_os_str().is_empty() {
                return None;
            }
        }
    }

    fn read_project_file(&mut self, dir: &Path) -> Option<String> {
        if let Some(cached) = self.dir_cache.get(dir) {
            return cached.clone();
        }

        let file = dir.join(PROJECT_DIR).join(PROJECT_FILE);
        let name = if file.is_file() {
            match fs::read_to_string(&file) {
                Ok(content) => content
                    .lines()
                    .map(str::trim)
                    .find(|l| !l.is_empty())
                    .map(str::to_string),
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "Failed to read project file");
                    None
                }
            }
        } else {
            None
        };

        if let Some(name) = &name {
            debug!(dir = %dir.display(), project = %name, "Found project file");
        }
        self.dir_cache.insert(dir.to_path_buf(), name.clone());
        name
    }
}
