//! Parent/child nesting from indentation
//!
//! Tasks arrive in source order with their leading-whitespace width. A stack
//! holds the chain of open ancestors; an entry at the same or a deeper
//! indent than the incoming task can never be its ancestor and is popped.

use tracing::warn;

use super::config::ParseLimits;

#[derive(Debug, Clone, Copy)]
struct Entry {
    index: usize,
    depth: usize,
    indent: usize,
}

/// Where a task landed in the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Index (in arrival order) of the parent task
    pub parent: Option<usize>,
    /// 0 for roots
    pub depth: usize,
}

/// Bounded stack machine assigning parents
#[derive(Debug)]
pub struct HierarchyBuilder<'a> {
    file: &'a str,
    stack: Vec<Entry>,
    operations: usize,
    max_operations: usize,
    max_size: usize,
    resets: usize,
    size_capped: bool,
}

impl<'a> HierarchyBuilder<'a> {
    /// `file` only labels guardrail warnings
    pub fn new(limits: &ParseLimits, file: &'a str) -> Self {
        Self {
            file,
            stack: Vec::new(),
            operations: 0,
            max_operations: limits.max_indent_stack_operations,
            max_size: limits.max_indent_stack_size,
            resets: 0,
            size_capped: false,
        }
    }

    /// Number of times the operation budget ran out
    pub fn resets(&self) -> usize {
        self.resets
    }

    /// Places the task with arrival index `index`, found on `line` with
    /// indent width `indent`
    pub fn place(&mut self, index: usize, line: usize, indent: usize) -> Placement {
        while self.stack.last().is_some_and(|top| top.indent >= indent) {
            if !self.spend(line) {
                break;
            }
            self.stack.pop();
        }

        let placement = match self.stack.last() {
            Some(parent) => Placement {
                parent: Some(parent.index),
                depth: parent.depth + 1,
            },
            None => Placement {
                parent: None,
                depth: 0,
            },
        };

        if self.stack.len() >= self.max_size {
            if !self.size_capped {
                warn!(
                    file = self.file,
                    line,
                    max_size = self.max_size,
                    "Indent stack is full; deeper tasks attach to the deepest tracked ancestor"
                );
                self.size_capped = true;
            }
            return placement;
        }

        if self.spend(line) {
            self.stack.push(Entry {
                index,
                depth: placement.depth,
                indent,
            });
        }

        placement
    }

    /// Counts one stack operation; on exhaustion clears the stack and returns false
    fn spend(&mut self, line: usize) -> bool {
        if self.operations >= self.max_operations {
            warn!(
                file = self.file,
                line,
                max_operations = self.max_operations,
                "Indent stack operation budget exhausted; resetting hierarchy"
            );
            self.stack.clear();
            self.operations = 0;
            self.resets += 1;
            return false;
        }
        self.operations += 1;
        true
    }
}
