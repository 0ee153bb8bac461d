//! Parser configuration
//!
//! Supplied once when a [`TaskParser`](super::TaskParser) is built and
//! swapped wholesale between calls. Every field has a default so a config
//! file only needs to name what it changes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::TaskStatus;

/// One of the two inline metadata syntaxes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// Glyph followed by a value: `📅 2024-12-31`, `🔺`, `#project/home`
    #[default]
    InlineSymbol,
    /// Bracketed field: `[due:: 2024-12-31]`
    BracketField,
}

impl Dialect {
    /// Returns the dialect that is tried second
    pub fn other(self) -> Self {
        match self {
            Dialect::InlineSymbol => Dialect::BracketField,
            Dialect::BracketField => Dialect::InlineSymbol,
        }
    }
}

/// Metadata fields a special-prefixed tag may be redirected into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialField {
    Project,
    Context,
    Area,
}

/// Status characters per category
///
/// Each string lists every character belonging to that category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusMarks {
    pub completed: String,
    pub in_progress: String,
    pub abandoned: String,
    pub planned: String,
    pub not_started: String,
}

impl Default for StatusMarks {
    fn default() -> Self {
        Self {
            completed: "xX".to_string(),
            in_progress: "/>".to_string(),
            abandoned: "-".to_string(),
            planned: "?".to_string(),
            not_started: " ".to_string(),
        }
    }
}

impl StatusMarks {
    /// Maps a raw status character to its category
    pub fn classify(&self, status: char) -> TaskStatus {
        if self.completed.contains(status) {
            TaskStatus::Completed
        } else if self.in_progress.contains(status) {
            TaskStatus::InProgress
        } else if self.abandoned.contains(status) {
            TaskStatus::Abandoned
        } else if self.planned.contains(status) {
            TaskStatus::Planned
        } else if self.not_started.contains(status) {
            TaskStatus::NotStarted
        } else {
            TaskStatus::Other
        }
    }
}

/// Prefixes (inline dialect) or field keys (bracket dialect) per field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPrefixes {
    pub project: String,
    pub context: String,
    pub area: String,
}

impl FieldPrefixes {
    pub fn get(&self, field: SpecialField) -> &str {
        match field {
            SpecialField::Project => &self.project,
            SpecialField::Context => &self.context,
            SpecialField::Area => &self.area,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefixConfig {
    /// e.g. `#project/home`, `@errands`, `#area/health`
    pub inline: FieldPrefixes,
    /// e.g. `[project:: home]`
    pub bracket: FieldPrefixes,
}

impl Default for PrefixConfig {
    fn default() -> Self {
        Self {
            inline: FieldPrefixes {
                project: "#project/".to_string(),
                context: "@".to_string(),
                area: "#area/".to_string(),
            },
            bracket: FieldPrefixes {
                project: "project".to_string(),
                context: "context".to_string(),
                area: "area".to_string(),
            },
        }
    }
}

/// Guardrails that bound the work done for one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseLimits {
    /// Lines scanned per document before parsing stops
    pub max_parse_iterations: usize,
    /// Metadata tokens removed per line before extraction stops
    pub max_metadata_iterations: usize,
    /// Push/pop operations on the indent stack per document
    pub max_indent_stack_operations: usize,
    /// Deepest nesting the indent stack tracks
    pub max_indent_stack_size: usize,
    /// Longer tags are consumed but not recorded
    pub max_tag_length: usize,
    /// Longer field values are consumed but not recorded
    pub max_value_length: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_parse_iterations: 100_000,
            max_metadata_iterations: 64,
            max_indent_stack_operations: 100_000,
            max_indent_stack_size: 100,
            max_tag_length: 100,
            max_value_length: 200,
        }
    }
}

/// Full parser configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Dialect tried first for every metadata kind
    pub preferred_dialect: Dialect,

    /// Status character that marks a task as completed (case-insensitive)
    pub done_marker: char,

    pub statuses: StatusMarks,

    pub prefixes: PrefixConfig,

    /// Tag prefix (without `#` and `/`) to the field it feeds
    pub special_tag_prefixes: BTreeMap<String, SpecialField>,

    /// Fill absent fields from file-level metadata
    pub inherit_file_metadata: bool,

    pub limits: ParseLimits,
}

impl Default for ParserConfig {
    fn default() -> Self {
        let special_tag_prefixes = [
            ("project", SpecialField::Project),
            ("area", SpecialField::Area),
            ("context", SpecialField::Context),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            preferred_dialect: Dialect::InlineSymbol,
            done_marker: 'x',
            statuses: StatusMarks::default(),
            prefixes: PrefixConfig::default(),
            special_tag_prefixes,
            inherit_file_metadata: true,
            limits: ParseLimits::default(),
        }
    }
}

impl ParserConfig {
    /// Returns a default config preferring `dialect`
    pub fn with_dialect(dialect: Dialect) -> Self {
        Self {
            preferred_dialect: dialect,
            ..Self::default()
        }
    }

    /// Returns true if `status` is the done marker, ignoring case
    pub fn is_done(&self, status: char) -> bool {
        status.to_lowercase().eq(self.done_marker.to_lowercase())
    }

    /// Dialects in the order they are tried
    pub fn dialect_order(&self) -> [Dialect; 2] {
        [self.preferred_dialect, self.preferred_dialect.other()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ParserConfig::default();

        assert_eq!(config.preferred_dialect, Dialect::InlineSymbol);
        assert_eq!(config.done_marker, 'x');
        assert_eq!(config.prefixes.inline.context, "@");
        assert_eq!(
            config.special_tag_prefixes.get("project"),
            Some(&SpecialField::Project)
        );
        assert_eq!(config.limits.max_indent_stack_size, 100);
    }

    #[test]
    fn done_marker_ignores_case() {
        let config = ParserConfig::default();

        assert!(config.is_done('x'));
        assert!(config.is_done('X'));
        assert!(!config.is_done('/'));
        assert!(!config.is_done(' '));
    }

    #[test]
    fn dialect_order_follows_preference() {
        let config = ParserConfig::with_dialect(Dialect::BracketField);

        assert_eq!(
            config.dialect_order(),
            [Dialect::BracketField, Dialect::InlineSymbol]
        );
    }

    #[test]
    fn status_marks_classify() {
        let marks = StatusMarks::default();

        assert_eq!(marks.classify('x'), TaskStatus::Completed);
        assert_eq!(marks.classify('X'), TaskStatus::Completed);
        assert_eq!(marks.classify('/'), TaskStatus::InProgress);
        assert_eq!(marks.classify('-'), TaskStatus::Abandoned);
        assert_eq!(marks.classify('?'), TaskStatus::Planned);
        assert_eq!(marks.classify(' '), TaskStatus::NotStarted);
        assert_eq!(marks.classify('b'), TaskStatus::Other);
    }

    #[test]
    fn parse_partial_toml() {
        let toml = r#"
preferred_dialect = "bracket_field"
done_marker = "d"

[limits]
max_tag_length = 20

[special_tag_prefixes]
proj = "project"
"#;

        let config: ParserConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.preferred_dialect, Dialect::BracketField);
        assert_eq!(config.done_marker, 'd');
        assert_eq!(config.limits.max_tag_length, 20);
        assert_eq!(config.limits.max_metadata_iterations, 64);
        assert_eq!(
            config.special_tag_prefixes.get("proj"),
            Some(&SpecialField::Project)
        );
        // Untouched sections keep their defaults
        assert_eq!(config.prefixes.inline.project, "#project/");
    }
}
