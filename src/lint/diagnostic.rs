//! Violation and edit types produced by rules.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Category of a lint rule
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    /// Secrets, injection, unsafe execution
    Security,
    /// Error handling, resources, network robustness
    Reliability,
    /// Leftovers and shortcuts (debug output, TODOs, loose types)
    Quality,
    /// Go-specific patterns
    Go,
    /// Rust-specific patterns
    Rust,
}

impl RuleCategory {
    /// All categories in display order
    pub const ALL: [Self; 5] = [
        Self::Security,
        Self::Reliability,
        Self::Quality,
        Self::Go,
        Self::Rust,
    ];
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Security => write!(f, "security"),
            Self::Reliability => write!(f, "reliability"),
            Self::Quality => write!(f, "quality"),
            Self::Go => write!(f, "go"),
            Self::Rust => write!(f, "rust"),
        }
    }
}

/// Severity level for violations
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational suggestion
    Info,
    /// Should fix, but not blocking
    Warning,
    /// Must fix, fails the run
    Error,
}

impl Severity {
    /// Parse a lowercase severity name
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "info" => Some(Self::Info),
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// SARIF `level` for this severity
    #[must_use]
    pub const fn sarif_level(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "note",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One reported occurrence of a rule's pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// The rule ID that produced this violation
    #[serde(rename = "rule")]
    pub rule_id: String,
    /// Reported severity (may be overridden by config)
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// File the violation belongs to
    pub file: PathBuf,
    /// 1-based line
    pub line: usize,
    /// 1-based column, in characters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    /// Trimmed source line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl Violation {
    /// Create a new violation without column or snippet
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        file: impl Into<PathBuf>,
        line: usize,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            message: message.into(),
            file: file.into(),
            line,
            column: None,
            snippet: None,
        }
    }

    /// Set the column
    #[must_use]
    pub const fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    /// Set the snippet
    #[must_use]
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{} [{}] {}: {}",
            self.file.display(),
            self.line,
            self.column.unwrap_or(1),
            self.severity,
            self.rule_id,
            self.message
        )
    }
}

/// A proposed line-level text change.
///
/// An empty `replacement` deletes the line. Otherwise `target` equal to the
/// whole current line replaces the line, and anything else replaces the first
/// occurrence of `target` within the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub file: PathBuf,
    /// 1-based target line
    pub line: usize,
    pub target: String,
    pub replacement: String,
}

impl Edit {
    /// Delete `line` entirely
    pub fn delete_line(file: &Path, line: usize, current: &str) -> Self {
        Self {
            file: file.to_path_buf(),
            line,
            target: current.to_string(),
            replacement: String::new(),
        }
    }

    /// Replace `target` with `replacement` on `line`
    pub fn replace(
        file: &Path,
        line: usize,
        target: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            file: file.to_path_buf(),
            line,
            target: target.into(),
            replacement: replacement.into(),
        }
    }

    /// Whether this edit removes its line
    #[must_use]
    pub fn is_deletion(&self) -> bool {
        self.replacement.is_empty()
    }
}
