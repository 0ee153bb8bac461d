//! `taskmark parse` and `taskmark line`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use super::output::{task_summary, Output};
use crate::domain::{ParseContext, Task};
use crate::parser::TaskParser;
use crate::storage::{Config, Document, ProjectResolver};

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Which tasks to print
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Open,
}

impl StatusFilter {
    pub fn from_flags(completed: bool, open: bool) -> Self {
        match (completed, open) {
            (true, false) => StatusFilter::Completed,
            (false, true) => StatusFilter::Open,
            _ => StatusFilter::All,
        }
    }

    fn keeps(&self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Completed => task.completed,
            StatusFilter::Open => !task.completed,
        }
    }
}

/// Parses files and directories, printing every task found
pub fn parse_paths(
    output: &Output,
    config: &Config,
    parser: &TaskParser,
    paths: &[PathBuf],
    filter: StatusFilter,
) -> Result<()> {
    let mut files = Vec::new();
    let mut failed = 0;
    for path in paths {
        if let Err(e) = collect_markdown(path, &mut files) {
            output.error(&format!("{:#}", e));
            failed += 1;
        }
    }
    debug!(files = files.len(), "Collected documents");

    let mut resolver = ProjectResolver::from_config(config);

    let mut all_tasks: Vec<Task> = Vec::new();

    for file in &files {
        let doc = match Document::read(file) {
            Ok(doc) => doc,
            Err(e) => {
                output.error(&format!("{:#}", e));
                failed += 1;
                continue;
            }
        };

        let absolute = fs::canonicalize(file).unwrap_or_else(|_| file.clone());
        let project = resolver.resolve(&absolute, &doc.frontmatter);

        let mut context = ParseContext::new().with_file_metadata(doc.frontmatter.clone());
        if let Some(project) = project {
            context = context.with_project(project);
        }

        let file_path = file.to_string_lossy();
        let tasks = parser.parse_with_context(&doc.task_text(), &file_path, &context);
        let tasks: Vec<Task> = tasks.into_iter().filter(|t| filter.keeps(t)).collect();

        if !output.is_json() && !tasks.is_empty() {
            output.message(&format!("{}", file.display()));
            for task in &tasks {
                output.task(task);
            }
        }
        all_tasks.extend(tasks);
    }

    if output.is_json() {
        output.data(&all_tasks);
    } else {
        let mut summary = format!("{} tasks in {} files", all_tasks.len(), files.len());
        if failed > 0 {
            summary.push_str(&format!(" ({} unreadable)", failed));
        }
        output.message(&summary);
    }

    Ok(())
}

/// Parses a single line of text
pub fn parse_line(output: &Output, parser: &TaskParser, text: &str, file: &str, line: usize) -> Result<()> {
    let task = parser.parse_single_line(text, file, line);

    if output.is_json() {
        output.data(&task);
        return Ok(());
    }

    match task {
        Some(task) => output.message(&task_summary(&task)),
        None => output.message("Not a task"),
    }
    Ok(())
}

/// Collects markdown files under `path`, sorted, skipping hidden directories
fn collect_markdown(path: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    if path.is_file() {
        files.push(path.to_path_buf());
        return Ok(());
    }

    let mut entries: Vec<PathBuf> = fs::read_dir(path)
        .with_context(|| format!("Failed to list directory: {}", path.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    for entry in entries {
        if entry.is_dir() {
            if is_hidden(&entry) {
                continue;
            }
            collect_markdown(&entry, files)?;
        } else if is_markdown(&entry) {
            files.push(entry);
        }
    }
    Ok(())
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| MARKDOWN_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}
