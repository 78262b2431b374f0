//! Rust rules.
//!
//! Panicking shortcuts, undocumented `unsafe`, and borrow-checker appeasement.

use std::sync::LazyLock;

use regex::Regex;

use crate::lint::diagnostic::{RuleCategory, Severity, Violation};
use crate::lint::rule::{BoxedRule, Rule, RuleMeta, SourceFile};

use super::{column_of, is_line_comment, is_test_file, report, window};

const RS: &[&str] = &["rs"];

/// Returns all Rust rules.
pub fn rust_rules() -> Vec<BoxedRule> {
    vec![
        Box::new(RustUnwrapRule),
        Box::new(RustUnsafeBlockRule),
        Box::new(RustCloneHeavyRule),
        Box::new(RustTodoMacroRule),
        Box::new(RustPanicRule),
    ]
}

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

static TEST_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| regex(r"#\[cfg\(test\)\]|#\[test\]"));

/// Source that declares tests anywhere in the file
fn has_tests(file: &SourceFile<'_>) -> bool {
    TEST_ATTRIBUTE.is_match(file.content)
}

/// Non-comment lines with a 1-based number, empty for test-named files
fn code_lines<'f>(file: &'f SourceFile<'_>) -> impl Iterator<Item = (usize, &'f str)> {
    let skip = is_test_file(file);
    file.lines
        .iter()
        .enumerate()
        .filter(move |(_, line)| !skip && !is_line_comment(line))
        .map(|(idx, line)| (idx + 1, *line))
}

/// One violation per match on each code line, with a column
fn report_matches(
    rule: &dyn Rule,
    file: &SourceFile<'_>,
    pattern: &Regex,
    message: impl Fn(&regex::Captures<'_>) -> String,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (line, text) in code_lines(file) {
        for caps in pattern.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            violations.push(
                report(rule, file, line, message(&caps)).with_column(column_of(text, whole.start())),
            );
        }
    }
    violations
}

// =============================================================================
// UNWRAP
// =============================================================================

static UNWRAP_CALL: LazyLock<Regex> = LazyLock::new(|| regex(r"\.unwrap\(\)"));

/// Flags `.unwrap()` outside files with tests.
pub struct RustUnwrapRule;

impl RustUnwrapRule {
    const META: RuleMeta = RuleMeta {
        id: "rust-unwrap",
        description: ".unwrap() outside of tests",
        category: RuleCategory::Rust,
        severity: Severity::Error,
        extensions: RS,
    };
}

impl Rule for RustUnwrapRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        if has_tests(file) {
            return Vec::new();
        }
        report_matches(self, file, &UNWRAP_CALL, |_| {
            ".unwrap() will panic on None/Err: use `?`, `unwrap_or`, or `match` instead".to_string()
        })
    }
}

// =============================================================================
// UNSAFE
// =============================================================================

static UNSAFE_BLOCK: LazyLock<Regex> = LazyLock::new(|| regex(r"\bunsafe\s*\{"));
static SAFETY_COMMENT: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)//\s*SAFETY\b"));

/// Lines above an `unsafe` block searched for a SAFETY comment
const SAFETY_LOOKBEHIND: usize = 3;

/// Flags `unsafe` blocks without a `// SAFETY:` comment just above.
pub struct RustUnsafeBlockRule;

impl RustUnsafeBlockRule {
    const META: RuleMeta = RuleMeta {
        id: "rust-unsafe-block",
        description: "unsafe blocks without SAFETY comments",
        category: RuleCategory::Rust,
        severity: Severity::Error,
        extensions: RS,
    };
}

impl Rule for RustUnsafeBlockRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        code_lines(file)
            .filter(|(_, text)| UNSAFE_BLOCK.is_match(text))
            .filter(|(line, _)| {
                let idx = line - 1;
                let above = window(&file.lines, idx.saturating_sub(SAFETY_LOOKBEHIND), idx);
                !SAFETY_COMMENT.is_match(&above)
            })
            .map(|(line, _)| {
                report(
                    self,
                    file,
                    line,
                    "unsafe block without `// SAFETY:` comment: document why this is safe",
                )
            })
            .collect()
    }
}

// =============================================================================
// CLONE
// =============================================================================

/// Clone calls in one file before each is reported
const CLONE_THRESHOLD: usize = 5;

/// Flags every `.clone()` line once a file reaches the clone threshold.
pub struct RustCloneHeavyRule;

impl RustCloneHeavyRule {
    const META: RuleMeta = RuleMeta {
        id: "rust-clone-heavy",
        description: "Excessive .clone() calls",
        category: RuleCategory::Rust,
        severity: Severity::Warning,
        extensions: RS,
    };
}

impl Rule for RustCloneHeavyRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        let clone_lines: Vec<usize> = code_lines(file)
            .filter(|(_, text)| text.contains(".clone()"))
            .map(|(line, _)| line)
            .collect();
        if clone_lines.len() < CLONE_THRESHOLD {
            return Vec::new();
        }

        let message = format!(
            "Excessive .clone() usage ({} in file): consider borrowing or using references",
            clone_lines.len()
        );
        clone_lines
            .into_iter()
            .map(|line| report(self, file, line, message.clone()))
            .collect()
    }
}

// =============================================================================
// PLACEHOLDER MACROS
// =============================================================================

static PLACEHOLDER_MACRO: LazyLock<Regex> =
    LazyLock::new(|| regex(r"\b(todo|unimplemented)!\s*\("));

/// Flags `todo!()` and `unimplemented!()`.
pub struct RustTodoMacroRule;

impl RustTodoMacroRule {
    const META: RuleMeta = RuleMeta {
        id: "rust-todo-macro",
        description: "todo!() and unimplemented!() left in code",
        category: RuleCategory::Rust,
        severity: Severity::Error,
        extensions: RS,
    };
}

impl Rule for RustTodoMacroRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        report_matches(self, file, &PLACEHOLDER_MACRO, |caps| {
            format!("{}!() macro left in code: implement before shipping", &caps[1])
        })
    }
}

// =============================================================================
// PANIC
// =============================================================================

static PANIC_CALL: LazyLock<Regex> = LazyLock::new(|| regex(r"\bpanic!\s*\("));

/// Flags `panic!()` in library code; binaries' `main.rs` and files with tests are exempt.
pub struct RustPanicRule;

impl RustPanicRule {
    const META: RuleMeta = RuleMeta {
        id: "rust-panic",
        description: "panic!() in library code",
        category: RuleCategory::Rust,
        severity: Severity::Error,
        extensions: RS,
    };
}

impl Rule for RustPanicRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        if file.file_name() == "main.rs" || has_tests(file) {
            return Vec::new();
        }
        // first call per line
        code_lines(file)
            .filter_map(|(line, text)| PANIC_CALL.find(text).map(|m| (line, text, m.start())))
            .map(|(line, text, start)| {
                report(
                    self,
                    file,
                    line,
                    "panic!() in library code: return Result or Option instead",
                )
                .with_column(column_of(text, start))
            })
            .collect()
    }
}
