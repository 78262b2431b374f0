//! Code quality rules.
//!
//! These rules flag shortcuts that tend to survive into generated code:
//! debug output, leftover markers, loose typing, and hardcoded environment
//! details.

use std::sync::LazyLock;

use regex::Regex;

use crate::lint::diagnostic::{Edit, RuleCategory, Severity, Violation};
use crate::lint::rule::{BoxedRule, Rule, RuleMeta, SourceFile};

use super::{column_of, is_line_comment, is_test_file, preceded_by_word, report};

const JS: &[&str] = &["ts", "js", "tsx", "jsx"];
const TS: &[&str] = &["ts", "tsx"];
const SOURCE: &[&str] = &["ts", "js", "tsx", "jsx", "py", "go", "rs"];

/// Returns all quality rules.
pub fn quality_rules() -> Vec<BoxedRule> {
    vec![
        Box::new(ConsoleLogRule),
        Box::new(TodoFixmeRule),
        Box::new(MagicNumbersRule),
        Box::new(AnyTypeRule),
        Box::new(MissingTypesRule),
        Box::new(HardcodedPathsRule),
        Box::new(HardcodedUrlsRule),
    ]
}

// =============================================================================
// CONSOLE OUTPUT
// =============================================================================

static CONSOLE_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"console\.(log|warn|error|info|debug)\s*\(").expect("valid regex")
});

/// Flags `console.*()` calls that should go through a structured logger.
///
/// Fix: deletes lines that hold nothing but the call statement.
pub struct ConsoleLogRule;

impl ConsoleLogRule {
    const META: RuleMeta = RuleMeta {
        id: "no-console-log",
        description: "console.log instead of structured logging",
        category: RuleCategory::Quality,
        severity: Severity::Warning,
        extensions: JS,
    };

    fn candidate_lines<'f>(
        file: &'f SourceFile<'_>,
    ) -> impl Iterator<Item = (usize, &'f str, regex::Captures<'f>)> {
        let skip = is_test_file(file);
        file.lines
            .iter()
            .enumerate()
            .filter(move |(_, line)| !skip && !is_line_comment(line))
            .filter_map(|(idx, line)| CONSOLE_CALL.captures(line).map(|caps| (idx + 1, *line, caps)))
    }

    /// Whether the line is exactly one `console.*(...)` statement
    fn is_standalone_call(line: &str) -> bool {
        let trimmed = line.trim();
        let Some(call) = CONSOLE_CALL.find(trimmed).filter(|m| m.start() == 0) else {
            return false;
        };
        let Some(close) = closing_paren(trimmed, call.end() - 1) else {
            return false;
        };
        matches!(trimmed[close + 1..].trim(), "" | ";")
    }
}

/// Byte index of the `)` matching the `(` at `open`, skipping string literals
fn closing_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (idx, ch) in text[open..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' | '`' => quote = Some(ch),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + idx);
                }
            }
            _ => {}
        }
    }
    None
}

impl Rule for ConsoleLogRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        Self::candidate_lines(file)
            .map(|(line, _, caps)| {
                report(
                    self,
                    file,
                    line,
                    format!("console.{}() left in code; use a structured logger instead", &caps[1]),
                )
            })
            .collect()
    }

    fn can_fix(&self) -> bool {
        true
    }

    fn fix(&self, file: &SourceFile<'_>) -> Vec<Edit> {
        Self::candidate_lines(file)
            .filter(|(_, text, _)| Self::is_standalone_call(text))
            .map(|(line, text, _)| Edit::delete_line(file.path, line, text))
            .collect()
    }
}

// =============================================================================
// LEFTOVER MARKERS
// =============================================================================

static TODO_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(TODO|FIXME|HACK|XXX|TEMP|TEMPORARY)\b").expect("valid regex")
});

/// Flags TODO/FIXME/HACK/XXX/TEMP markers.
///
/// Fix: deletes comment-only lines and strips trailing marker comments from
/// code lines.
pub struct TodoFixmeRule;

impl TodoFixmeRule {
    const META: RuleMeta = RuleMeta {
        id: "no-todo-fixme",
        description: "TODO/FIXME comments left by agents",
        category: RuleCategory::Quality,
        severity: Severity::Info,
        extensions: SOURCE,
    };

    /// Byte offset of the comment that holds the marker at `marker`
    fn comment_start(line: &str, marker: usize, python: bool) -> Option<usize> {
        let head = &line[..marker];
        let slash = head.rfind("//");
        let block = head.rfind("/*");
        let hash = if python { head.rfind('#') } else { None };
        [slash, block, hash].into_iter().flatten().max()
    }
}

impl Rule for TodoFixmeRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (idx, line) in file.lines.iter().enumerate() {
            for caps in TODO_MARKER.captures_iter(line) {
                let Some(marker) = caps.get(1) else { continue };
                violations.push(
                    report(
                        self,
                        file,
                        idx + 1,
                        format!("{} comment: resolve before shipping", marker.as_str()),
                    )
                    .with_column(column_of(line, marker.start())),
                );
            }
        }
        violations
    }

    fn can_fix(&self) -> bool {
        true
    }

    fn fix(&self, file: &SourceFile<'_>) -> Vec<Edit> {
        let python = file.extension().as_deref() == Some("py");
        let mut edits = Vec::new();

        for (idx, line) in file.lines.iter().enumerate() {
            if !TODO_MARKER.is_match(line) {
                continue;
            }
            let start = if line.trim_start().starts_with('*') {
                Some(0)
            } else {
                TODO_MARKER
                    .find_iter(line)
                    .find_map(|marker| Self::comment_start(line, marker.start(), python))
            };
            let Some(start) = start else { continue };

            let code = line[..start].trim_end();
            if code.is_empty() {
                edits.push(Edit::delete_line(file.path, idx + 1, line));
            } else {
                edits.push(Edit::replace(file.path, idx + 1, *line, code));
            }
        }
        edits
    }
}

// =============================================================================
// MAGIC NUMBERS
// =============================================================================

const ALLOWED_NUMBERS: &[&str] = &[
    "-1", "0", "1", "2", "100", "200", "201", "204", "301", "302", "400", "401", "403", "404",
    "500",
];

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{2,}\b").expect("valid regex"));

static NAMED_DECLARATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(import|const\s+\w+\s*=)").expect("valid regex"));

/// Flags multi-digit literals that should be named constants.
pub struct MagicNumbersRule;

impl MagicNumbersRule {
    const META: RuleMeta = RuleMeta {
        id: "no-magic-numbers",
        description: "Magic numbers without named constants",
        category: RuleCategory::Quality,
        severity: Severity::Info,
        extensions: JS,
    };

    /// A quote within the 20 bytes before `idx` suggests string content
    fn quoted(line: &str, idx: usize) -> bool {
        let mut from = idx.saturating_sub(20);
        while !line.is_char_boundary(from) {
            from -= 1;
        }
        line[from..idx].contains(['\'', '"', '`'])
    }
}

impl Rule for MagicNumbersRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (idx, line) in file.lines.iter().enumerate() {
            let trimmed = line.trim_start();
            if trimmed.starts_with("//") || trimmed.starts_with('*') {
                continue;
            }
            if NAMED_DECLARATION.is_match(line) {
                continue;
            }

            for m in NUMBER.find_iter(line) {
                if preceded_by_word(line, m.start()) || line[..m.start()].ends_with('.') {
                    continue;
                }
                if ALLOWED_NUMBERS.contains(&m.as_str()) || Self::quoted(line, m.start()) {
                    continue;
                }
                violations.push(report(
                    self,
                    file,
                    idx + 1,
                    format!("Magic number {}: extract to a named constant", m.as_str()),
                ));
            }
        }
        violations
    }
}

// =============================================================================
// LOOSE TYPING
// =============================================================================

static ANY_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r":\s*any\b|\bas\s+any\b|<any>|\bany\[\]").expect("valid regex")
});

static ANY_REWRITES: LazyLock<[(Regex, &'static str); 4]> = LazyLock::new(|| {
    [
        (Regex::new(r":(\s*)any\b").expect("valid regex"), ":${1}unknown"),
        (Regex::new(r"\bas(\s+)any\b").expect("valid regex"), "as${1}unknown"),
        (Regex::new(r"<any>").expect("valid regex"), "<unknown>"),
        (Regex::new(r"\bany\[\]").expect("valid regex"), "unknown[]"),
    ]
});

/// Flags the TypeScript `any` type.
///
/// Fix: rewrites each `any` usage on the line to `unknown`.
pub struct AnyTypeRule;

impl AnyTypeRule {
    const META: RuleMeta = RuleMeta {
        id: "no-any-type",
        description: "Usage of `any` type in TypeScript",
        category: RuleCategory::Quality,
        severity: Severity::Warning,
        extensions: TS,
    };

    fn rewrite(line: &str) -> String {
        ANY_REWRITES
            .iter()
            .fold(line.to_string(), |acc, (re, rep)| re.replace_all(&acc, *rep).into_owned())
    }
}

impl Rule for AnyTypeRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (idx, line) in file.lines.iter().enumerate() {
            if is_line_comment(line) {
                continue;
            }
            for m in ANY_TYPE.find_iter(line) {
                violations.push(
                    report(self, file, idx + 1, "Usage of `any` type: define a proper type")
                        .with_column(column_of(line, m.start())),
                );
            }
        }
        violations
    }

    fn can_fix(&self) -> bool {
        true
    }

    fn fix(&self, file: &SourceFile<'_>) -> Vec<Edit> {
        file.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| !is_line_comment(line) && ANY_TYPE.is_match(line))
            .filter_map(|(idx, line)| {
                let rewritten = Self::rewrite(line);
                (rewritten != *line).then(|| Edit::replace(file.path, idx + 1, *line, rewritten))
            })
            .collect()
    }
}

// =============================================================================
// MISSING RETURN TYPES
// =============================================================================

static FUNCTION_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:export\s+)?(?:async\s+)?function\s+(\w+)\s*\([^)]*\)\s*(:\s*[^{]+)?\{")
        .expect("valid regex")
});

/// Flags top-level TypeScript functions without a return type annotation.
pub struct MissingTypesRule;

impl MissingTypesRule {
    const META: RuleMeta = RuleMeta {
        id: "missing-types",
        description: "TS functions without return type annotations",
        category: RuleCategory::Quality,
        severity: Severity::Info,
        extensions: TS,
    };
}

impl Rule for MissingTypesRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        if is_test_file(file) || file.path_str().ends_with(".d.ts") {
            return Vec::new();
        }
        if !matches!(file.extension().as_deref(), Some("ts" | "tsx")) {
            return Vec::new();
        }

        FUNCTION_DECL
            .captures_iter(file.content)
            .filter(|caps| caps.get(2).is_none())
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let name = caps.get(1)?.as_str();
                Some(report(
                    self,
                    file,
                    file.line_of_offset(whole.start()),
                    format!("Function '{name}' is missing a return type annotation"),
                ))
            })
            .collect()
    }
}

// =============================================================================
// HARDCODED PATHS AND URLS
// =============================================================================

/// Pattern with the message prefix it reports
struct LabeledPattern {
    regex: Regex,
    label: &'static str,
}

fn labeled(pattern: &str, label: &'static str) -> LabeledPattern {
    LabeledPattern {
        regex: Regex::new(pattern).expect("valid regex"),
        label,
    }
}

static PATH_PATTERNS: LazyLock<Vec<LabeledPattern>> = LazyLock::new(|| {
    vec![
        labeled(r"/Users/\w+", "Hardcoded macOS user path"),
        labeled(r"/home/\w+", "Hardcoded Linux user path"),
        labeled(r"C:\\\\Users\\\\\w+", "Hardcoded Windows user path"),
        labeled(r"/tmp/[a-zA-Z]", "Hardcoded /tmp path"),
        labeled(r"/var/log/[a-zA-Z]", "Hardcoded /var/log path"),
    ]
});

/// Flags user home, temp, and log paths baked into source.
pub struct HardcodedPathsRule;

impl HardcodedPathsRule {
    const META: RuleMeta = RuleMeta {
        id: "no-hardcoded-paths",
        description: "Hardcoded file system paths",
        category: RuleCategory::Quality,
        severity: Severity::Error,
        extensions: SOURCE,
    };
}

impl Rule for HardcodedPathsRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (idx, line) in file.lines.iter().enumerate() {
            let trimmed = line.trim_start();
            if trimmed.starts_with("//") || trimmed.starts_with('#') || trimmed.starts_with('*') {
                continue;
            }
            for pattern in PATH_PATTERNS.iter() {
                for m in pattern.regex.find_iter(line) {
                    violations.push(
                        report(self, file, idx + 1, format!("{}: \"{}\"", pattern.label, m.as_str()))
                            .with_column(column_of(line, m.start())),
                    );
                }
            }
        }
        violations
    }
}

static URL_PATTERNS: LazyLock<Vec<LabeledPattern>> = LazyLock::new(|| {
    vec![
        labeled(r"https?://localhost[:/]", "Hardcoded localhost URL"),
        labeled(r"https?://127\.0\.0\.1[:/]", "Hardcoded 127.0.0.1 URL"),
        labeled(r"https?://0\.0\.0\.0[:/]", "Hardcoded 0.0.0.0 URL"),
    ]
});

static PORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\d{4,5}(?:/|\b)").expect("valid regex"));

static CONFIG_OR_TEST_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(test|spec|config)\.[a-z]+$").expect("valid regex"));

/// Flags loopback URLs and literal port numbers.
pub struct HardcodedUrlsRule;

impl HardcodedUrlsRule {
    const META: RuleMeta = RuleMeta {
        id: "no-hardcoded-urls",
        description: "Hardcoded localhost URLs and ports",
        category: RuleCategory::Quality,
        severity: Severity::Warning,
        extensions: SOURCE,
    };
}

impl Rule for HardcodedUrlsRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        if CONFIG_OR_TEST_FILE.is_match(&file.path_str()) {
            return Vec::new();
        }

        let mut violations = Vec::new();
        for (idx, line) in file.lines.iter().enumerate() {
            let trimmed = line.trim_start();
            if trimmed.starts_with("//") || trimmed.starts_with('#') {
                continue;
            }

            let mut found = |label: &str, start: usize, text: &str| {
                violations.push(
                    report(self, file, idx + 1, format!("{label}: \"{text}\""))
                        .with_column(column_of(line, start)),
                );
            };

            for pattern in URL_PATTERNS.iter() {
                for m in pattern.regex.find_iter(line) {
                    found(pattern.label, m.start(), m.as_str());
                }
            }
            for m in PORT.find_iter(line) {
                if !preceded_by_word(line, m.start()) {
                    found("Hardcoded port number", m.start(), m.as_str());
                }
            }
        }
        violations
    }
}
