//! taskmark - Task extraction for markdown outlines
//!
//! Reads checkbox lines such as `- [ ] Pay rent 📅 2024-12-31 #home` and
//! produces structured task records: status, cleaned content, dates,
//! priority, recurrence, project/context/area, tags, heading context and
//! parent/child nesting. Two metadata dialects are understood, inline
//! emoji symbols and `[key:: value]` bracket fields.

pub mod domain;
pub mod parser;
pub mod storage;
pub mod cli;

pub use domain::{ParseContext, Task, TaskId, TaskMetadata, TaskStatus};
pub use parser::{Dialect, ParserConfig, TaskParser};
