//! Configuration handling for taskmark
//!
//! Configuration is stored in `.taskmark/config.toml` (project) and
//! `~/.config/taskmark/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::{Dialect, ParserConfig};

/// Name of the per-project directory
pub const PROJECT_DIR: &str = ".taskmark";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Maps a path prefix to a project name
///
/// ```toml
/// [[project_mappings]]
/// path = "work/"
/// project = "Work"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMapping {
    /// Path prefix, relative to the project root
    pub path: String,
    pub project: String,
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProjectConfig {
    /// Parser settings
    pub parser: ParserConfig,

    /// Path prefix to project assignments
    pub project_mappings: Vec<ProjectMapping>,
}

impl ProjectConfig {
    /// Rejects settings the parser cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        for mapping in &self.project_mappings {
            if mapping.path.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "project mapping for '{}' has an empty path",
                    mapping.project
                )));
            }
            if mapping.project.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "project mapping for path '{}' has an empty project",
                    mapping.path
                )));
            }
        }

        if self.parser.limits.max_parse_iterations == 0 {
            return Err(ConfigError::Invalid(
                "limits.max_parse_iterations must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,

    /// Dialect used outside of any project
    pub preferred_dialect: Option<Dialect>,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from default locations
    pub fn load() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        Self::load_from(&cwd)
    }

    /// Loads configuration for the project enclosing `start`, if any
    pub fn load_from(start: &Path) -> Result<Self> {
        match Self::find_project_root_from(start) {
            Some(root) => Self::for_project(&root),
            None => Ok(Self {
                global: Self::load_global()?,
                ..Self::default()
            }),
        }
    }

    /// Loads configuration for a specific project
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(project_root)?;

        Ok(Self {
            project,
            global,
            project_root: Some(project_root.to_path_buf()),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "taskmark", "taskmark").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Parser settings in effect
    ///
    /// The project file wins; the global dialect only applies outside a project.
    pub fn parser_config(&self) -> ParserConfig {
        let mut parser = self.project.parser.clone();
        if !self.is_in_project() {
            if let Some(dialect) = self.global.preferred_dialect {
                parser.preferred_dialect = dialect;
            }
        }
        parser
    }

    /// Loads global configuration
    fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads project configuration from a specific root
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(PROJECT_DIR).join("config.toml");

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")?;

        config
            .validate()
            .with_context(|| format!("Invalid project config: {}", config_path.display()))?;

        Ok(config)
    }

    /// Finds the project root by looking for `.taskmark/` in `start` or a parent
    pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Returns true if we're in a taskmark project
    pub fn is_in_project(&self) -> bool {
        self.project_root.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config::default();

        assert_eq!(config.project.parser, ParserConfig::default());
        assert!(config.project.project_mappings.is_empty());
        assert_eq!(config.global.default_format, OutputFormat::Text);
        assert!(!config.is_in_project());
    }

    #[test]
    fn parse_project_config() {
        let toml = r#"
[parser]
preferred_dialect = "bracket_field"
done_marker = "X"

[parser.limits]
max_tag_length = 40

[[project_mappings]]
path = "work/"
project = "Work"
"#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.parser.preferred_dialect, Dialect::BracketField);
        assert_eq!(config.parser.done_marker, 'X');
        assert_eq!(config.parser.limits.max_tag_length, 40);
        assert_eq!(config.parser.limits.max_value_length, 200);
        assert_eq!(
            config.project_mappings,
            vec![ProjectMapping {
                path: "work/".to_string(),
                project: "Work".to_string(),
            }]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_global_config() {
        let toml = r#"
default_format = "json"
preferred_dialect = "bracket_field"
"#;

        let config: GlobalConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.default_format, OutputFormat::Json);
        assert_eq!(config.preferred_dialect, Some(Dialect::BracketField));
    }

    #[test]
    fn global_dialect_applies_only_outside_project() {
        let mut config = Config::default();
        config.global.preferred_dialect = Some(Dialect::BracketField);
        assert_eq!(config.parser_config().preferred_dialect, Dialect::BracketField);

        config.project_root = Some(PathBuf::from("/tmp/notes"));
        assert_eq!(config.parser_config().preferred_dialect, Dialect::InlineSymbol);
    }

    #[test]
    fn empty_mapping_is_invalid() {
        let config: ProjectConfig = toml::from_str(
            r#"
[[project_mappings]]
path = ""
project = "Work"
"#,
        )
        .unwrap();

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn find_project_root() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(PROJECT_DIR)).unwrap();

        let sub_dir = dir.path().join("sub").join("dir");
        fs::create_dir_all(&sub_dir).unwrap();

        let root = Config::find_project_root_from(&sub_dir);
        // Canonicalize both paths to handle macOS /var -> /private/var symlinks
        let expected = dir.path().canonicalize().ok();
        let actual = root.and_then(|p| p.canonicalize().ok());
        assert_eq!(actual, expected);
    }

    #[test]
    fn load_project_config_from_disk() {
        let dir = TempDir::new().unwrap();
        let project_dir = dir.path().join(PROJECT_DIR);
        fs::create_dir_all(&project_dir).unwrap();
        fs::write(
            project_dir.join("config.toml"),
            "[parser]\npreferred_dialect = \"bracket_field\"\n",
        )
        .unwrap();

        let config = Config::for_project(dir.path()).unwrap();
        assert!(config.is_in_project());
        assert_eq!(config.parser_config().preferred_dialect, Dialect::BracketField);
    }

    #[test]
    fn malformed_project_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let project_dir = dir.path().join(PROJECT_DIR);
        fs::create_dir_all(&project_dir).unwrap();
        fs::write(project_dir.join("config.toml"), "parser = [").unwrap();

        let err = Config::for_project(dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse project config"));
    }
}
