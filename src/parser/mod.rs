//! # Task Parser
//!
//! Turns markdown outline text into [`Task`] records.
//!
//! ## Pipeline
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Classify | `classify` | fence / heading / task / text per line |
//! | Mask | `mask` | link and code spans hidden from tag rules |
//! | Extract | `extract` | metadata fields and cleaned content |
//! | Nest | `hierarchy` | parent, children and depth |
//!
//! ## Dialects
//!
//! Two metadata syntaxes are recognised on every line:
//!
//! ```text
//! - [ ] Pay rent 📅 2024-12-31 ⏫ #home         (inline symbols)
//! - [ ] Pay rent [due:: 2024-12-31] [priority:: high]   (bracket fields)
//! ```
//!
//! The preferred dialect is tried first for each field; the other fills
//! whatever is still missing.
//!
//! ## Guarantees
//!
//! - Parsing never fails. A line that is not a task contributes nothing.
//! - A parse is a pure function of `(text, file_path, config)`; no state
//!   carries over between calls.
//! - Every loop is bounded by [`ParseLimits`].

mod classify;
mod config;
mod extract;
mod hierarchy;
mod mask;
mod patterns;
pub mod symbols;

pub use classify::{heading, is_fence, task_line, HeadingStack, LineClassifier, LineKind, TaskLine};
pub use config::{
    Dialect, FieldPrefixes, ParseLimits, ParserConfig, PrefixConfig, SpecialField, StatusMarks,
};
pub use extract::{apply_context, collapse_whitespace, Extraction, MetadataExtractor};
pub use hierarchy::{HierarchyBuilder, Placement};
pub use mask::{exclusion_spans, MaskedText};
pub use patterns::{MetadataKind, PatternTable, Rule, TokenMatch};

use tracing::{debug, warn};

use crate::domain::{ParseContext, Task, TaskId};

/// The parsing engine
///
/// Holds the configuration and the pattern table compiled from it. The
/// table is rebuilt only when the configuration is replaced.
pub struct TaskParser {
    config: ParserConfig,
    patterns: PatternTable,
}

impl Default for TaskParser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl TaskParser {
    pub fn new(config: ParserConfig) -> Self {
        let patterns = PatternTable::new(&config);
        Self { config, patterns }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Replaces the configuration and recompiles the pattern table
    pub fn update_config(&mut self, config: ParserConfig) {
        self.patterns = PatternTable::new(&config);
        self.config = config;
    }

    /// Parses every task in `text`, in source order
    pub fn parse(&self, text: &str, file_path: &str) -> Vec<Task> {
        self.parse_with_context(text, file_path, &ParseContext::default())
    }

    /// Parses `text`, filling absent fields from file metadata and the
    /// resolved project in `context`
    pub fn parse_with_context(&self, text: &str, file_path: &str, context: &ParseContext) -> Vec<Task> {
        let limits = &self.config.limits;
        let mut classifier = LineClassifier::new();
        let mut headings = HeadingStack::new();
        let mut hierarchy = HierarchyBuilder::new(limits, file_path);
        let mut tasks: Vec<Task> = Vec::new();
        let mut line_count = 0;

        for (line_no, line) in text.lines().enumerate() {
            if line_no >= limits.max_parse_iterations {
                warn!(
                    file = file_path,
                    max_lines = limits.max_parse_iterations,
                    "Line limit reached; remaining lines were not parsed"
                );
                break;
            }
            line_count += 1;

            match classifier.classify(line) {
                LineKind::Heading { level, text } => headings.push(level, text),
                LineKind::Task(task_line) => {
                    let mut task = self.build_task(line, &task_line, file_path, line_no, context);
                    task.metadata.heading = headings.chain();

                    let index = tasks.len();
                    let placement = hierarchy.place(index, line_no, task_line.indent);
                    task.depth = placement.depth;
                    if let Some(parent) = placement.parent {
                        task.metadata.parent = Some(tasks[parent].id.clone());
                        tasks[parent].metadata.children.push(task.id.clone());
                    }
                    tasks.push(task);
                }
                LineKind::FenceToggle | LineKind::Text => {}
            }
        }

        if classifier.in_fence() {
            debug!(file = file_path, "Unclosed code fence at end of document");
        }

        debug!(
            file = file_path,
            lines = line_count,
            tasks = tasks.len(),
            hierarchy_resets = hierarchy.resets(),
            "Parsed document"
        );

        tasks
    }

    /// Parses one line on its own, with no heading or hierarchy context
    ///
    /// `line_number` is the 0-based index the line has in its document.
    pub fn parse_single_line(&self, text: &str, file_path: &str, line_number: usize) -> Option<Task> {
        let line = text.lines().next().unwrap_or("");
        if is_fence(line) {
            return None;
        }
        let task_line = task_line(line)?;
        Some(self.build_task(line, &task_line, file_path, line_number, &ParseContext::default()))
    }

    fn build_task(
        &self,
        line: &str,
        task_line: &TaskLine<'_>,
        file_path: &str,
        line_no: usize,
        context: &ParseContext,
    ) -> Task {
        let extractor = MetadataExtractor::new(&self.config, &self.patterns);
        let extraction = extractor.extract(task_line.content);
        if extraction.budget_exhausted {
            warn!(
                file = file_path,
                line = line_no,
                max_tokens = self.config.limits.max_metadata_iterations,
                "Metadata token limit reached; remaining tokens left in content"
            );
        }

        let mut metadata = extraction.metadata;
        apply_context(&mut metadata, context, &self.config);

        Task {
            id: TaskId::new(file_path, line_no),
            content: extraction.content,
            file_path: file_path.to_string(),
            line: line_no,
            original_markdown: line.to_string(),
            status: task_line.status,
            status_kind: self.config.statuses.classify(task_line.status),
            completed: self.config.is_done(task_line.status),
            depth: 0,
            metadata,
        }
    }
}
