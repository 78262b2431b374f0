//! Human-readable lint report.

use std::collections::HashMap;
use std::path::Path;

use console::{StyledObject, style};

use crate::lint::{LintResult, Severity, Violation};

fn severity_label(severity: Severity) -> StyledObject<String> {
    let (icon, label) = match severity {
        Severity::Error => ("✗", "error"),
        Severity::Warning => ("⚠", "warning"),
        Severity::Info => ("ℹ", "info"),
    };
    paint(severity, format!("{icon} {label}"))
}

fn paint(severity: Severity, text: String) -> StyledObject<String> {
    match severity {
        Severity::Error => style(text).red(),
        Severity::Warning => style(text).yellow(),
        Severity::Info => style(text).cyan(),
    }
}

/// `(N files, M rules, Xms)`
fn run_stats(result: &LintResult) -> String {
    format!(
        "({} files, {} rules, {}ms)",
        result.units_scanned, result.rules_applied, result.duration_ms
    )
}

/// Violations grouped by file in first-appearance order, each group sorted by line
fn group_by_file(violations: &[Violation]) -> Vec<(&Path, Vec<&Violation>)> {
    let mut groups: Vec<(&Path, Vec<&Violation>)> = Vec::new();
    let mut index: HashMap<&Path, usize> = HashMap::new();

    for violation in violations {
        let slot = *index.entry(violation.file.as_path()).or_insert_with(|| {
            groups.push((violation.file.as_path(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(violation);
    }

    for (_, group) in &mut groups {
        group.sort_by_key(|v| v.line);
    }
    groups
}

/// Render `result` as styled terminal text
#[must_use]
pub fn render(result: &LintResult) -> String {
    if result.violations.is_empty() {
        return format!("{} {}\n", style("✓ No issues found").bold(), run_stats(result));
    }

    let mut lines = Vec::new();
    for (file, violations) in group_by_file(&result.violations) {
        lines.push(format!("\n{}", style(file.display()).bold()));
        for v in violations {
            lines.push(format!(
                "  {}  {}  {}  {}",
                style(format!("{}:{}", v.line, v.column.unwrap_or(1))).dim(),
                severity_label(v.severity),
                v.message,
                style(&v.rule_id).dim()
            ));
        }
    }

    let mut parts = Vec::new();
    let errors = result.error_count();
    let warnings = result.warning_count();
    let infos = result.info_count();
    if errors > 0 {
        parts.push(paint(Severity::Error, plural(errors, "error")).to_string());
    }
    if warnings > 0 {
        parts.push(paint(Severity::Warning, plural(warnings, "warning")).to_string());
    }
    if infos > 0 {
        parts.push(paint(Severity::Info, format!("{infos} info")).to_string());
    }

    lines.push(String::new());
    lines.push(format!("{} {}", parts.join(", "), run_stats(result)));
    lines.join("\n") + "\n"
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
