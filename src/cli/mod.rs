//! Command-line interface definition.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::output::OutputFormat;

/// Production-readiness checker for agent-generated code
#[derive(Parser, Debug)]
#[command(name = "agentlint", version, about, long_about = None)]
#[command(after_help = "Examples:\n  agentlint src/\n  git diff | agentlint --stdin\n  agentlint . --sarif > results.sarif\n  agentlint . --fix")]
pub struct Cli {
    /// Directory or file to scan
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Read a unified diff from stdin and lint only the added lines
    #[arg(long, conflicts_with = "fix")]
    pub stdin: bool,

    /// Output format
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Shorthand for --format json
    #[arg(long)]
    pub json: bool,

    /// Shorthand for --format sarif
    #[arg(long, conflicts_with = "json")]
    pub sarif: bool,

    /// Only report error-severity violations
    #[arg(long)]
    pub errors_only: bool,

    /// Apply auto-fixes in place
    #[arg(long)]
    pub fix: bool,

    /// Config file (default: .agentlintrc.json or .agentlintrc.toml)
    #[arg(long, value_name = "PATH", env = "AGENTLINT_CONFIG")]
    pub config: Option<PathBuf>,

    /// List all available rules
    #[arg(long, conflicts_with = "explain")]
    pub list_rules: bool,

    /// Show details for one rule
    #[arg(long, value_name = "RULE")]
    pub explain: Option<String>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress logging
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Emit logs as JSON on stderr
    #[arg(long)]
    pub log_json: bool,
}

impl Cli {
    /// Effective format after the `--json`/`--sarif` shorthands
    #[must_use]
    pub const fn output_format(&self) -> OutputFormat {
        if self.sarif {
            OutputFormat::Sarif
        } else if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["agentlint"]).unwrap();
        assert_eq!(cli.path, PathBuf::from("."));
        assert_eq!(cli.output_format(), OutputFormat::Human);
        assert!(!cli.stdin && !cli.fix && !cli.errors_only);
    }

    #[test]
    fn test_format_shorthands() {
        let cli = Cli::try_parse_from(["agentlint", "src", "--json"]).unwrap();
        assert_eq!(cli.output_format(), OutputFormat::Json);
        assert_eq!(cli.path, PathBuf::from("src"));

        let cli = Cli::try_parse_from(["agentlint", "--sarif"]).unwrap();
        assert_eq!(cli.output_format(), OutputFormat::Sarif);

        let cli = Cli::try_parse_from(["agentlint", "--format", "json"]).unwrap();
        assert_eq!(cli.output_format(), OutputFormat::Json);

        assert!(Cli::try_parse_from(["agentlint", "--json", "--sarif"]).is_err());
    }

    #[test]
    fn test_conflicting_modes_rejected() {
        assert!(Cli::try_parse_from(["agentlint", "--stdin", "--fix"]).is_err());
        assert!(Cli::try_parse_from(["agentlint", "-v", "--quiet"]).is_err());
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::try_parse_from(["agentlint", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
