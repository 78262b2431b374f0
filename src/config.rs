//! Config file discovery and parsing.
//!
//! A broken config never fails a run: problems are logged and defaults used.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{AgentlintError, Result};
use crate::lint::config::{LintConfig, RuleSetting};

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "AGENTLINT_CONFIG";

/// Files probed in the working directory, in order
pub const CONFIG_FILES: [&str; 2] = [".agentlintrc.json", ".agentlintrc.toml"];

/// On-disk shape shared by the JSON and TOML formats
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    rules: BTreeMap<String, String>,
    #[serde(default)]
    ignore: Vec<String>,
    #[serde(default)]
    extensions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

/// Resolve and load the run configuration.
///
/// Order: `explicit`, then `$AGENTLINT_CONFIG`, then the config files in
/// `cwd`. Any failure falls back to defaults; only an explicitly named file
/// that cannot be used produces a warning.
#[must_use]
pub fn load(explicit: Option<&Path>, cwd: &Path) -> LintConfig {
    let named = explicit
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

    if let Some(path) = named {
        return match load_file(&path) {
            Ok(config) => config,
            Err(err) => {
                warn!("could not load config from {}: {err}", path.display());
                LintConfig::default()
            }
        };
    }

    for name in CONFIG_FILES {
        let path = cwd.join(name);
        if !path.is_file() {
            continue;
        }
        match load_file(&path) {
            Ok(config) => return config,
            Err(err) => {
                debug!("ignoring config {}: {err}", path.display());
                return LintConfig::default();
            }
        }
    }

    debug!("no config file found, using defaults");
    LintConfig::default()
}

/// Read and parse one config file
pub fn load_file(path: &Path) -> Result<LintConfig> {
    let raw = std::fs::read_to_string(path).map_err(|err| AgentlintError::io(path, err))?;
    let config = parse(&raw, Format::of(path))
        .map_err(|err| AgentlintError::Config(format!("parse config {}: {err}", path.display())))?;
    debug!("loaded config from {}", path.display());
    Ok(config)
}

/// Parse JSON config text
pub fn parse_json(raw: &str) -> Result<LintConfig> {
    parse(raw, Format::Json)
}

/// Parse TOML config text
pub fn parse_toml(raw: &str) -> Result<LintConfig> {
    parse(raw, Format::Toml)
}

fn parse(raw: &str, format: Format) -> Result<LintConfig> {
    let file: ConfigFile = match format {
        Format::Json => serde_json::from_str(raw)?,
        Format::Toml => toml::from_str(raw).map_err(|err| AgentlintError::Config(err.to_string()))?,
    };
    Ok(file.into_config())
}

impl ConfigFile {
    fn into_config(self) -> LintConfig {
        let mut config = LintConfig::new();

        for (rule_id, value) in self.rules {
            match RuleSetting::parse(&value) {
                Some(setting) => {
                    config.rules.insert(rule_id, setting);
                }
                None => warn!("ignoring setting '{value}' for rule '{rule_id}'"),
            }
        }

        config.ignore = self.ignore;
        config.extensions = self
            .extensions
            .map(|exts| exts.iter().map(|e| normalize_extension(e)).collect());
        config
    }
}

/// Ensure a leading dot
fn normalize_extension(ext: &str) -> String {
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{ext}")
    }
}
