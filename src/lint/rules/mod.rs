//! Built-in lint rules.
//!
//! Rules are organized by category:
//!
//! - **Quality rules** (`quality`): debug output, TODOs, loose typing, hardcoded values
//! - **Reliability rules** (`reliability`): error handling, timeouts, resource cleanup
//! - **Security rules** (`security`): credentials, dynamic evaluation, injection, permissive settings
//! - **Go rules** (`go`): Go-specific pitfalls
//! - **Rust rules** (`rust`): Rust-specific pitfalls
//!
//! # Usage
//!
//! ```
//! use agentlint::lint::{LintConfig, LintEngine, RuleRegistry, SourceUnit};
//!
//! let registry = RuleRegistry::builtin();
//! let config = LintConfig::default();
//! let engine = LintEngine::new(&registry, &config);
//! let result = engine.run(&[SourceUnit::file("app.ts", "console.log(user);\n")]);
//! assert_eq!(result.violations[0].rule_id, "no-console-log");
//! ```

pub mod go;
pub mod quality;
pub mod reliability;
pub mod rust;
pub mod security;

use std::sync::LazyLock;

use regex::Regex;

use crate::lint::diagnostic::Violation;
use crate::lint::rule::{BoxedRule, Rule, SourceFile};

// Re-export individual rules for direct use
pub use go::{
    GoBareReturnRule, GoDeferInLoopRule, GoErrorIgnoredRule, GoGoroutineLeakRule,
    GoInitFunctionRule, GoNilCheckMissingRule,
};
pub use quality::{
    AnyTypeRule, ConsoleLogRule, HardcodedPathsRule, HardcodedUrlsRule, MagicNumbersRule,
    MissingTypesRule, TodoFixmeRule,
};
pub use reliability::{
    EmptyCatchRule, InputValidationRule, ResourceLeakRule, RetryLogicRule, SyncFsRule,
    TimeoutRule, UnboundedLoopRule, UnboundedQueryRule, UnhandledAsyncRule,
};
pub use rust::{
    RustCloneHeavyRule, RustPanicRule, RustTodoMacroRule, RustUnsafeBlockRule, RustUnwrapRule,
};
pub use security::{CredentialLeakRule, OverlyPermissiveRule, SqlInjectionRule, UnsafeEvalRule};

/// Returns all quality rules.
pub fn quality_rules() -> Vec<BoxedRule> {
    quality::quality_rules()
}

/// Returns all reliability rules.
pub fn reliability_rules() -> Vec<BoxedRule> {
    reliability::reliability_rules()
}

/// Returns all security rules.
pub fn security_rules() -> Vec<BoxedRule> {
    security::security_rules()
}

/// Returns all Go rules.
pub fn go_rules() -> Vec<BoxedRule> {
    go::go_rules()
}

/// Returns all Rust rules.
pub fn rust_rules() -> Vec<BoxedRule> {
    rust::rust_rules()
}

/// Returns all built-in rules in registration order.
pub fn all_rules() -> Vec<BoxedRule> {
    let mut rules = quality_rules();
    rules.extend(reliability_rules());
    rules.extend(security_rules());
    rules.extend(go_rules());
    rules.extend(rust_rules());
    rules
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

static TEST_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(test|spec)\.[a-z]+$").expect("valid regex"));

/// `*.test.*` / `*.spec.*` files
pub(crate) fn is_test_file(file: &SourceFile<'_>) -> bool {
    TEST_FILE.is_match(&file.path_str())
}

/// Test files by JS naming or Go `_test.go`
pub(crate) fn is_go_test_file(file: &SourceFile<'_>) -> bool {
    is_test_file(file) || file.path_str().ends_with("_test.go")
}

/// Line starts with `//` after indentation
pub(crate) fn is_line_comment(line: &str) -> bool {
    line.trim_start().starts_with("//")
}

/// 1-based character column of byte offset `idx` in `line`
pub(crate) fn column_of(line: &str, idx: usize) -> usize {
    line[..idx.min(line.len())].chars().count() + 1
}

/// Violation from `rule` at `line`, carrying that line as snippet
pub(crate) fn report(
    rule: &dyn Rule,
    file: &SourceFile<'_>,
    line: usize,
    message: impl Into<String>,
) -> Violation {
    let violation = Violation::new(rule.id(), rule.default_severity(), message, file.path, line);
    match file.snippet(line) {
        Some(snippet) => violation.with_snippet(snippet),
        None => violation,
    }
}

/// Whether the byte before `idx` is a word character
pub(crate) fn preceded_by_word(text: &str, idx: usize) -> bool {
    text[..idx]
        .chars()
        .next_back()
        .is_some_and(|c| c.is_alphanumeric() || c == '_')
}

/// Balanced `{...}` block starting at the first `{` at or after `start`
pub(crate) fn extract_block(content: &str, start: usize) -> Option<&str> {
    let open = start + content[start..].find('{')?;
    let mut depth = 0usize;
    for (i, b) in content.bytes().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&content[open..=i]);
                }
            }
            _ => {}
        }
    }
    Some(&content[open..])
}

/// Lines `[from, to)` clamped to the file, joined with newlines
pub(crate) fn window(lines: &[&str], from: usize, to: usize) -> String {
    let to = to.min(lines.len());
    let from = from.min(to);
    lines[from..to].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::Path;

    #[test]
    fn test_all_rules_count() {
        assert_eq!(all_rules().len(), 31);
        assert_eq!(quality_rules().len(), 7);
        assert_eq!(reliability_rules().len(), 9);
        assert_eq!(security_rules().len(), 4);
        assert_eq!(go_rules().len(), 6);
        assert_eq!(rust_rules().len(), 5);
    }

    #[test]
    fn test_rule_ids_unique() {
        let rules = all_rules();
        let ids: HashSet<&str> = rules.iter().map(|r| r.id()).collect();
        assert_eq!(ids.len(), rules.len(), "All rule IDs must be unique");
    }

    #[test]
    fn test_fixable_rules() {
        let fixable: Vec<&str> = all_rules()
            .iter()
            .filter(|r| r.can_fix())
            .map(|r| r.id())
            .collect();
        assert_eq!(
            fixable,
            vec!["no-console-log", "no-todo-fixme", "no-any-type", "no-empty-catch"]
        );
    }

    #[test]
    fn test_helpers() {
        assert!(is_test_file(&SourceFile::new(Path::new("src/a.test.ts"), "")));
        assert!(!is_test_file(&SourceFile::new(Path::new("src/test.ts"), "")));
        assert!(is_go_test_file(&SourceFile::new(Path::new("x_test.go"), "")));
        assert!(is_line_comment("   // hi"));
        assert_eq!(column_of("héllo world", "héllo ".len()), 7);
        assert!(preceded_by_word("abc:8080", 3));
        assert!(!preceded_by_word(" :8080", 1));
        assert_eq!(extract_block("fn x() { a { b } c } d", 0), Some("{ a { b } c }"));
        assert_eq!(extract_block("no braces", 0), None);
        assert_eq!(window(&["a", "b", "c"], 1, 10), "b\nc");
    }
}
