//! Main CLI application structure

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::parse_cmd::{self, StatusFilter};
use crate::parser::{Dialect, TaskParser};
use crate::storage::Config;

/// Environment variable holding a tracing filter, e.g. `taskmark=trace`
pub const LOG_ENV: &str = "TASKMARK_LOG";

#[derive(Parser)]
#[command(name = "taskmark")]
#[command(author, version, about = "Extract tasks and their metadata from markdown outlines")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true, env = "TASKMARK_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse markdown files or directories and list their tasks
    Parse {
        /// Files or directories (searched recursively for .md files)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Metadata dialect to prefer
        #[arg(long, value_enum)]
        dialect: Option<DialectArg>,

        /// Only completed tasks
        #[arg(long, conflicts_with = "open")]
        completed: bool,

        /// Only tasks that are not completed
        #[arg(long)]
        open: bool,
    },

    /// Parse a single line
    Line {
        /// The line to parse, e.g. "- [ ] Call Bob 📅 2024-12-31"
        text: String,

        /// File path used for the task id
        #[arg(long, default_value = "untitled.md")]
        file: String,

        /// 0-based line number used for the task id
        #[arg(long, default_value = "0")]
        line: usize,

        /// Metadata dialect to prefer
        #[arg(long, value_enum)]
        dialect: Option<DialectArg>,
    },

    /// Show the effective configuration
    Config,
}

/// Dialect names accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    /// `📅 2024-12-31`, `⏫`, `#project/x`
    Inline,
    /// `[due:: 2024-12-31]`, `[priority:: high]`
    Bracket,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Inline => Dialect::InlineSymbol,
            DialectArg::Bracket => Dialect::BracketField,
        }
    }
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load()?;
    let output = Output::new(
        cli.format
            .unwrap_or_else(|| config.global.default_format.into()),
    );

    debug!(project_root = ?config.project_root, "Loaded configuration");

    match cli.command {
        Commands::Parse {
            paths,
            dialect,
            completed,
            open,
        } => {
            let parser = build_parser(&config, dialect);
            parse_cmd::parse_paths(
                &output,
                &config,
                &parser,
                &paths,
                StatusFilter::from_flags(completed, open),
            )?
        }

        Commands::Line {
            text,
            file,
            line,
            dialect,
        } => {
            let parser = build_parser(&config, dialect);
            parse_cmd::parse_line(&output, &parser, &text, &file, line)?
        }

        Commands::Config => show_config(&output, &config)?,
    }

    debug!("Command completed successfully");
    Ok(())
}

/// Installs the stderr subscriber; `--verbose` overrides the environment
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}

fn build_parser(config: &Config, dialect: Option<DialectArg>) -> TaskParser {
    let mut parser_config = config.parser_config();
    if let Some(dialect) = dialect {
        parser_config.preferred_dialect = dialect.into();
    }
    TaskParser::new(parser_config)
}

/// Prints the effective parser config (TOML in text mode)
fn show_config(output: &Output, config: &Config) -> Result<()> {
    let mut project = config.project.clone();
    project.parser = config.parser_config();

    if output.is_json() {
        output.data(&project);
        return Ok(());
    }

    if let Some(root) = &config.project_root {
        output.message(&format!("# project root: {}", root.display()));
    }
    let toml = toml::to_string_pretty(&project).context("Failed to serialize config")?;
    output.message(toml.trim_end());
    Ok(())
}
