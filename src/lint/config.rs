//! Rule configuration shared by the lint and fix engines.

use std::collections::HashMap;
use std::fmt;

use super::diagnostic::Severity;

/// Configured state of one rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSetting {
    /// Removed from both linting and fixing
    Off,
    /// Report every violation of the rule with this severity
    Severity(Severity),
}

impl RuleSetting {
    /// Parse `"off"` or a severity name
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        if value == "off" {
            Some(Self::Off)
        } else {
            Severity::parse(value).map(Self::Severity)
        }
    }
}

impl fmt::Display for RuleSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Severity(severity) => write!(f, "{severity}"),
        }
    }
}

/// Read-only configuration for a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintConfig {
    /// Per-rule overrides by rule ID
    pub rules: HashMap<String, RuleSetting>,

    /// Extra directory/file names or globs to skip while walking
    pub ignore: Vec<String>,

    /// Extension allow-list (with leading dot); `None` uses the defaults
    pub extensions: Option<Vec<String>>,
}

impl LintConfig {
    /// Create a new default config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn a rule off
    #[must_use]
    pub fn disable_rule(mut self, rule_id: impl Into<String>) -> Self {
        self.rules.insert(rule_id.into(), RuleSetting::Off);
        self
    }

    /// Override severity for a rule
    #[must_use]
    pub fn override_severity(mut self, rule_id: impl Into<String>, severity: Severity) -> Self {
        self.rules
            .insert(rule_id.into(), RuleSetting::Severity(severity));
        self
    }

    /// Add an extra ignore entry
    #[must_use]
    pub fn ignore(mut self, entry: impl Into<String>) -> Self {
        self.ignore.push(entry.into());
        self
    }

    /// Restrict walked extensions
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = Some(extensions.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn is_rule_disabled(&self, rule_id: &str) -> bool {
        matches!(self.rules.get(rule_id), Some(RuleSetting::Off))
    }

    /// Configured severity, if the rule has a non-off override
    #[must_use]
    pub fn severity_override(&self, rule_id: &str) -> Option<Severity> {
        match self.rules.get(rule_id) {
            Some(RuleSetting::Severity(severity)) => Some(*severity),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = LintConfig::new();
        assert!(config.rules.is_empty());
        assert!(config.ignore.is_empty());
        assert!(config.extensions.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = LintConfig::new()
            .disable_rule("no-console-log")
            .override_severity("no-magic-numbers", Severity::Error)
            .ignore("generated")
            .with_extensions([".ts"]);

        assert!(config.is_rule_disabled("no-console-log"));
        assert!(!config.is_rule_disabled("no-magic-numbers"));
        assert_eq!(
            config.severity_override("no-magic-numbers"),
            Some(Severity::Error)
        );
        assert_eq!(config.severity_override("no-console-log"), None);
        assert_eq!(config.ignore, vec!["generated".to_string()]);
        assert_eq!(config.extensions, Some(vec![".ts".to_string()]));
    }

    #[test]
    fn test_rule_setting_parse() {
        assert_eq!(RuleSetting::parse("off"), Some(RuleSetting::Off));
        assert_eq!(
            RuleSetting::parse("info"),
            Some(RuleSetting::Severity(Severity::Info))
        );
        assert_eq!(RuleSetting::parse("loud"), None);
        assert_eq!(RuleSetting::Off.to_string(), "off");
    }
}
