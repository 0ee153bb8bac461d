//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose | Example |
//! |---------|---------|---------|
//! | `parse` | List tasks in files or directories | `taskmark parse notes/ --open` |
//! | `line` | Parse one line | `taskmark line "- [ ] Call Bob 📅 2024-12-31"` |
//! | `config` | Show the effective configuration | `taskmark config` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Logging
//!
//! Diagnostics go to stderr through `tracing`. Use `--verbose` (or `-v`)
//! for debug output, or set `TASKMARK_LOG` to a filter:
//! ```bash
//! TASKMARK_LOG=trace taskmark parse notes/
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod parse_cmd;

pub use app::{run, Cli, Commands, DialectArg, LOG_ENV};
pub use output::{task_summary, Output, OutputFormat};
