//! Lint engine for running rules against source units.

use std::path::PathBuf;
use std::time::Instant;

use rayon::prelude::*;

use super::config::LintConfig;
use super::diagnostic::{RuleCategory, Severity, Violation};
use super::diff::{AddedLine, DiffFile};
use super::rule::{Rule, RuleRegistry, SourceFile, unit_extension};

/// Where a unit's content came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOrigin {
    /// Full file content read from disk
    File,
    /// Added lines of a diff; index `n - 1` maps synthetic line `n`
    Diff(Vec<AddedLine>),
}

/// A piece of text to lint under a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub content: String,
    pub origin: UnitOrigin,
}

impl SourceUnit {
    /// Unit holding a whole file's content
    pub fn file(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            origin: UnitOrigin::File,
        }
    }

    /// Unit holding only the added lines of a diff section
    #[must_use]
    pub fn from_diff(file: DiffFile) -> Self {
        let content = file.synthetic_content();
        Self {
            path: file.path,
            content,
            origin: UnitOrigin::Diff(file.added_lines),
        }
    }

    /// Whether line numbers reported against this unit need remapping
    #[must_use]
    pub const fn is_diff(&self) -> bool {
        matches!(self.origin, UnitOrigin::Diff(_))
    }
}

/// Aggregated outcome of one lint run
#[derive(Debug, Clone, Default)]
pub struct LintResult {
    /// All violations, in unit order then registry order
    pub violations: Vec<Violation>,
    pub units_scanned: usize,
    /// Number of rules not configured off
    pub rules_applied: usize,
    pub duration_ms: u64,
}

impl LintResult {
    /// Get error violations
    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.by_severity(Severity::Error)
    }

    /// Get warning violations
    pub fn warnings(&self) -> impl Iterator<Item = &Violation> {
        self.by_severity(Severity::Warning)
    }

    /// Get info violations
    pub fn infos(&self) -> impl Iterator<Item = &Violation> {
        self.by_severity(Severity::Info)
    }

    fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(move |v| v.severity == severity)
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    #[must_use]
    pub fn info_count(&self) -> usize {
        self.infos().count()
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Keep only error-severity violations
    pub fn retain_errors(&mut self) {
        self.violations.retain(|v| v.severity == Severity::Error);
    }
}

/// Dispatches enabled rules over units and merges their findings
pub struct LintEngine<'a> {
    registry: &'a RuleRegistry,
    config: &'a LintConfig,
}

impl<'a> LintEngine<'a> {
    #[must_use]
    pub const fn new(registry: &'a RuleRegistry, config: &'a LintConfig) -> Self {
        Self { registry, config }
    }

    /// Rules that are not configured off, in registry order
    pub fn enabled_rules(&self) -> impl Iterator<Item = &'a dyn Rule> + '_ {
        self.registry
            .iter()
            .filter(|rule| !self.config.is_rule_disabled(rule.id()))
    }

    /// Lint every unit and aggregate the findings
    #[must_use]
    pub fn run(&self, units: &[SourceUnit]) -> LintResult {
        let start = Instant::now();
        let rules: Vec<&dyn Rule> = self.enabled_rules().collect();

        let per_unit: Vec<Vec<Violation>> = units
            .par_iter()
            .map(|unit| self.lint_unit(&rules, unit))
            .collect();

        LintResult {
            violations: per_unit.into_iter().flatten().collect(),
            units_scanned: units.len(),
            rules_applied: rules.len(),
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }

    fn lint_unit(&self, rules: &[&dyn Rule], unit: &SourceUnit) -> Vec<Violation> {
        let file = SourceFile::new(&unit.path, &unit.content);
        let extension = unit_extension(&unit.path);
        let mut violations = Vec::new();

        for rule in rules
            .iter()
            .filter(|rule| rule.applies_to(extension.as_deref()))
        {
            let severity = self.config.severity_override(rule.id());
            for mut violation in rule.check(&file) {
                if let Some(severity) = severity {
                    violation.severity = severity;
                }
                if let UnitOrigin::Diff(added) = &unit.origin {
                    remap_line(&mut violation, added);
                }
                violations.push(violation);
            }
        }

        violations
    }

    /// List all registered rules
    #[must_use]
    pub fn list_rules(&self) -> Vec<RuleInfo> {
        self.registry
            .iter()
            .map(|r| RuleInfo {
                id: r.id(),
                description: r.description(),
                category: r.category(),
                default_severity: r.default_severity(),
                severity: self
                    .config
                    .severity_override(r.id())
                    .unwrap_or_else(|| r.default_severity()),
                extensions: r.extensions(),
                can_fix: r.can_fix(),
                disabled: self.config.is_rule_disabled(r.id()),
            })
            .collect()
    }
}

/// Replace a synthetic line with its new-file line; out-of-range stays as is.
fn remap_line(violation: &mut Violation, added: &[AddedLine]) {
    if let Some(line) = violation
        .line
        .checked_sub(1)
        .and_then(|idx| added.get(idx))
    {
        violation.line = line.original_line;
    }
}

/// Information about a registered rule
#[derive(Debug, Clone)]
pub struct RuleInfo {
    pub id: &'static str,
    pub description: &'static str,
    pub category: RuleCategory,
    pub default_severity: Severity,
    /// Severity after config overrides
    pub severity: Severity,
    pub extensions: &'static [&'static str],
    /// Whether the rule supports auto-fix
    pub can_fix: bool,
    /// Whether the rule is configured off
    pub disabled: bool,
}
