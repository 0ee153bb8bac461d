//! # Storage Layer
//!
//! Everything the parser needs from disk: configuration, document text
//! with its frontmatter, and the project a document belongs to.
//!
//! ## Files
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Config | TOML | `.taskmark/config.toml` |
//! | Global config | TOML | `~/.config/taskmark/config.toml` |
//! | Directory project | Plain text, first non-empty line | `<dir>/.taskmark/project` |
//! | File metadata | YAML frontmatter | top of each `.md` file |
//!
//! ## Project Structure
//!
//! ```text
//! notes/
//! ├── .taskmark/
//! │   └── config.toml       # Parser settings and project mappings
//! ├── work/
//! │   ├── .taskmark/
//! │   │   └── project       # "Work"
//! │   └── standup.md
//! └── home.md
//! ```
//!
//! ## Key Types
//!
//! - [`Config`] - Project and global configuration
//! - [`Document`] - A markdown file and its frontmatter
//! - [`ProjectResolver`] - Assigns a project to each document

mod config;
mod document;
mod project;

pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig, ProjectMapping, PROJECT_DIR};
pub use document::{parse_frontmatter, split_frontmatter, Document, DocumentError};
pub use project::{ProjectResolver, PROJECT_KEY};
