//! agentlint --list-rules / --explain RULE - Rule catalogue

use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json};
use crate::error::{AgentlintError, Result};
use crate::lint::{LintEngine, RuleCategory, RuleInfo};
use crate::output::OutputFormat;

/// Serializable view of a rule with the effective config applied
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RuleView {
    id: String,
    description: String,
    category: String,
    severity: String,
    default_severity: String,
    extensions: Vec<String>,
    can_fix: bool,
    enabled: bool,
}

impl From<&RuleInfo> for RuleView {
    fn from(info: &RuleInfo) -> Self {
        Self {
            id: info.id.to_string(),
            description: info.description.to_string(),
            category: info.category.to_string(),
            severity: info.severity.to_string(),
            default_severity: info.default_severity.to_string(),
            extensions: info.extensions.iter().map(ToString::to_string).collect(),
            can_fix: info.can_fix,
            enabled: !info.disabled,
        }
    }
}

pub fn list(ctx: &AppContext) -> Result<()> {
    let rules = LintEngine::new(&ctx.registry, &ctx.config).list_rules();

    if ctx.output_format == OutputFormat::Human {
        emit_human(list_layout(&rules));
    } else {
        let views: Vec<RuleView> = rules.iter().map(RuleView::from).collect();
        emit_json(&views)?;
    }
    Ok(())
}

pub fn explain(ctx: &AppContext, rule_id: &str) -> Result<()> {
    let rules = LintEngine::new(&ctx.registry, &ctx.config).list_rules();
    let rule = rules
        .iter()
        .find(|r| r.id == rule_id)
        .ok_or_else(|| AgentlintError::NotFound(format!("rule '{rule_id}' (see --list-rules)")))?;

    if ctx.output_format == OutputFormat::Human {
        emit_human(explain_layout(rule));
    } else {
        emit_json(&RuleView::from(rule))?;
    }
    Ok(())
}

const fn category_title(category: RuleCategory) -> &'static str {
    match category {
        RuleCategory::Security => "Security",
        RuleCategory::Reliability => "Reliability",
        RuleCategory::Quality => "Quality",
        RuleCategory::Go => "Go",
        RuleCategory::Rust => "Rust",
    }
}

fn list_layout(rules: &[RuleInfo]) -> HumanLayout {
    let mut layout = HumanLayout::new();
    layout.title(&format!("Available Lint Rules ({})", rules.len()));

    for category in RuleCategory::ALL {
        let in_category: Vec<_> = rules.iter().filter(|r| r.category == category).collect();
        if in_category.is_empty() {
            continue;
        }

        layout.section(category_title(category));
        for rule in in_category {
            let fix_badge = if rule.can_fix { " [fixable]" } else { "" };
            let off = if rule.disabled { " [off]" } else { "" };
            layout.bullet(&format!(
                "{} - {} ({}){fix_badge}{off}",
                rule.id, rule.description, rule.severity
            ));
        }
        layout.blank();
    }

    layout.push_line("Use --explain <RULE> for details.");
    layout
}

fn explain_layout(rule: &RuleInfo) -> HumanLayout {
    let severity = if rule.severity == rule.default_severity {
        rule.severity.to_string()
    } else {
        format!("{} (default {})", rule.severity, rule.default_severity)
    };
    let extensions = if rule.extensions.is_empty() {
        "all".to_string()
    } else {
        rule.extensions.join(", ")
    };

    let mut layout = HumanLayout::new();
    layout.title(&format!("Rule: {}", rule.id));
    layout.kv("Category", category_title(rule.category));
    layout.kv("Severity", &severity);
    layout.kv("Extensions", &extensions);
    layout.kv("Auto-fix", if rule.can_fix { "Yes" } else { "No" });
    layout.kv("Status", if rule.disabled { "off" } else { "enabled" });
    layout.blank();
    layout.section("Description");
    layout.push_line(rule.description);
    layout
}
