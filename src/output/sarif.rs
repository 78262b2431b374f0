//! SARIF 2.1.0 lint report.
//!
//! Only rules that produced results are listed in the driver, and each
//! result points at its rule by index into that list.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::Result;
use crate::lint::{LintResult, RuleRegistry, Severity, Violation};

const SARIF_SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/main/sarif-2.1/schema/sarif-schema-2.1.0.json";
const SARIF_VERSION: &str = "2.1.0";
const INFORMATION_URI: &str = "https://github.com/alexmelges/agentlint";

#[derive(Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: &'static str,
    version: &'static str,
    runs: Vec<SarifRun>,
}

#[derive(Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
    invocations: Vec<SarifInvocation>,
}

#[derive(Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifDriver {
    name: &'static str,
    version: &'static str,
    information_uri: &'static str,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRule {
    id: String,
    name: String,
    short_description: SarifMessage,
    default_configuration: SarifConfiguration,
    properties: SarifRuleProperties,
}

#[derive(Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
struct SarifConfiguration {
    level: &'static str,
}

#[derive(Serialize)]
struct SarifRuleProperties {
    tags: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: String,
    rule_index: usize,
    level: &'static str,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<SarifResultProperties>,
}

#[derive(Serialize)]
struct SarifResultProperties {
    snippet: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLocation {
    physical_location: SarifPhysicalLocation,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifPhysicalLocation {
    artifact_location: SarifArtifactLocation,
    region: SarifRegion,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifArtifactLocation {
    uri: String,
    uri_base_id: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRegion {
    start_line: usize,
    start_column: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifInvocation {
    execution_successful: bool,
    properties: SarifInvocationProperties,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifInvocationProperties {
    files_scanned: usize,
    rules_applied: usize,
    duration_ms: u64,
}

/// Rule ids in first-appearance order
fn used_rules(violations: &[Violation]) -> Vec<&str> {
    let mut seen = Vec::new();
    for v in violations {
        if !seen.contains(&v.rule_id.as_str()) {
            seen.push(v.rule_id.as_str());
        }
    }
    seen
}

fn describe_rule(id: &str, registry: &RuleRegistry) -> SarifRule {
    let rule = registry.get(id);
    let tags = match rule.map(|r| r.extensions()) {
        Some(exts) if !exts.is_empty() => exts.iter().map(ToString::to_string).collect(),
        _ => vec!["general".to_string()],
    };
    SarifRule {
        id: id.to_string(),
        name: id.to_string(),
        short_description: SarifMessage {
            text: rule.map_or_else(|| id.to_string(), |r| r.description().to_string()),
        },
        default_configuration: SarifConfiguration {
            level: rule.map_or(Severity::Warning, |r| r.default_severity()).sarif_level(),
        },
        properties: SarifRuleProperties { tags },
    }
}

fn to_result(v: &Violation, rule_index: usize) -> SarifResult {
    let path = v.file.to_string_lossy();
    SarifResult {
        rule_id: v.rule_id.clone(),
        rule_index,
        level: v.severity.sarif_level(),
        message: SarifMessage {
            text: v.message.clone(),
        },
        locations: vec![SarifLocation {
            physical_location: SarifPhysicalLocation {
                artifact_location: SarifArtifactLocation {
                    uri: path.strip_prefix('/').unwrap_or(&path).to_string(),
                    uri_base_id: "%SRCROOT%",
                },
                region: SarifRegion {
                    start_line: v.line,
                    start_column: v.column.unwrap_or(1),
                },
            },
        }],
        properties: v.snippet.as_ref().map(|snippet| SarifResultProperties {
            snippet: snippet.clone(),
        }),
    }
}

/// Pretty-printed SARIF log with a single run
pub fn render(result: &LintResult, registry: &RuleRegistry) -> Result<String> {
    let used = used_rules(&result.violations);
    let index: HashMap<&str, usize> = used.iter().enumerate().map(|(i, id)| (*id, i)).collect();

    let report = SarifReport {
        schema: SARIF_SCHEMA,
        version: SARIF_VERSION,
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "agentlint",
                    version: env!("CARGO_PKG_VERSION"),
                    information_uri: INFORMATION_URI,
                    rules: used.iter().map(|id| describe_rule(id, registry)).collect(),
                },
            },
            results: result
                .violations
                .iter()
                .map(|v| to_result(v, index.get(v.rule_id.as_str()).copied().unwrap_or(0)))
                .collect(),
            invocations: vec![SarifInvocation {
                execution_successful: true,
                properties: SarifInvocationProperties {
                    files_scanned: result.units_scanned,
                    rules_applied: result.rules_applied,
                    duration_ms: result.duration_ms,
                },
            }],
        }],
    };

    Ok(serde_json::to_string_pretty(&report)?)
}
