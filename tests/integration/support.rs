//! Small purpose-built rules for exercising the engines.

use agentlint::lint::{
    Edit, Rule, RuleCategory, RuleMeta, Severity, SourceFile, Violation,
};

/// Reports and deletes every line containing `DEBUG_PRINT`
pub struct DebugPrintRule;

impl DebugPrintRule {
    const META: RuleMeta = RuleMeta {
        id: "debug-print",
        description: "DEBUG_PRINT left in code",
        category: RuleCategory::Quality,
        severity: Severity::Error,
        extensions: &[],
    };
}

impl Rule for DebugPrintRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        file.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.contains("DEBUG_PRINT"))
            .map(|(idx, _)| {
                Violation::new(self.id(), self.default_severity(), "debug print", file.path, idx + 1)
            })
            .collect()
    }

    fn can_fix(&self) -> bool {
        true
    }

    fn fix(&self, file: &SourceFile<'_>) -> Vec<Edit> {
        file.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.contains("DEBUG_PRINT"))
            .map(|(idx, line)| Edit::delete_line(file.path, idx + 1, line))
            .collect()
    }
}

/// Reports and strips the substring `TODO`
pub struct TodoStripRule;

impl TodoStripRule {
    const META: RuleMeta = RuleMeta {
        id: "todo-strip",
        description: "TODO marker",
        category: RuleCategory::Quality,
        severity: Severity::Info,
        extensions: &[],
    };
}

impl Rule for TodoStripRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        file.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.contains("TODO"))
            .map(|(idx, _)| {
                Violation::new(self.id(), self.default_severity(), "todo", file.path, idx + 1)
            })
            .collect()
    }

    fn can_fix(&self) -> bool {
        true
    }

    fn fix(&self, file: &SourceFile<'_>) -> Vec<Edit> {
        file.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.contains("TODO"))
            .map(|(idx, _)| Edit::replace(file.path, idx + 1, "TODO", "DONE"))
            .collect()
    }
}
