use std::path::PathBuf;

use crate::cli::Cli;
use crate::error::{AgentlintError, Result};
use crate::lint::{LintConfig, RuleRegistry};
use crate::output::OutputFormat;

/// Everything a command needs, resolved once from the command line.
pub struct AppContext {
    pub cwd: PathBuf,
    pub config: LintConfig,
    pub registry: RuleRegistry,
    pub output_format: OutputFormat,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|err| AgentlintError::io(".", err))?;
        let config = crate::config::load(cli.config.as_deref(), &cwd);

        Ok(Self {
            cwd,
            config,
            registry: RuleRegistry::builtin(),
            output_format: cli.output_format(),
        })
    }

    /// Context over an explicit directory and config, for embedding and tests
    #[must_use]
    pub fn new(cwd: impl Into<PathBuf>, config: LintConfig, output_format: OutputFormat) -> Self {
        Self {
            cwd: cwd.into(),
            config,
            registry: RuleRegistry::builtin(),
            output_format,
        }
    }

    /// Resolve a command-line path against the working directory
    #[must_use]
    pub fn resolve(&self, path: &std::path::Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}
