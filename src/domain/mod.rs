//! Domain models for taskmark
//!
//! Contains the task records the parser produces and the boundary types
//! collaborators hand to it, without any I/O concerns.

mod context;
mod id;
mod task;

pub use context::{FileMetadata, ParseContext, ProjectAssignment, ProjectSource};
pub use id::{IdError, TaskId};
pub use task::{local_midnight, DateField, Task, TaskMetadata, TaskStatus, Timestamp};
pub(crate) use task::fill;
