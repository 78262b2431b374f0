//! JSON lint report.

use serde::Serialize;

use crate::error::Result;
use crate::lint::{LintResult, Violation};

#[derive(Serialize)]
struct JsonReport<'a> {
    violations: &'a [Violation],
    summary: JsonSummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSummary {
    total: usize,
    errors: usize,
    warnings: usize,
    infos: usize,
    files_scanned: usize,
    rules_applied: usize,
    duration_ms: u64,
}

/// Pretty-printed JSON with a `violations` array and a `summary` object
pub fn render(result: &LintResult) -> Result<String> {
    let report = JsonReport {
        violations: &result.violations,
        summary: JsonSummary {
            total: result.violations.len(),
            errors: result.error_count(),
            warnings: result.warning_count(),
            infos: result.info_count(),
            files_scanned: result.units_scanned,
            rules_applied: result.rules_applied,
            duration_ms: result.duration_ms,
        },
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
