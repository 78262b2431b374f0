//! Security rules.
//!
//! Hardcoded secrets, dynamic code evaluation, SQL built from strings, and
//! settings left wide open.

use std::sync::LazyLock;

use regex::Regex;

use crate::lint::diagnostic::{RuleCategory, Severity, Violation};
use crate::lint::rule::{BoxedRule, Rule, RuleMeta, SourceFile};

use super::{column_of, is_test_file, report, window};

const JS_PY: &[&str] = &["ts", "js", "tsx", "jsx", "py"];

/// Returns all security rules.
pub fn security_rules() -> Vec<BoxedRule> {
    vec![
        Box::new(CredentialLeakRule),
        Box::new(UnsafeEvalRule),
        Box::new(SqlInjectionRule),
        Box::new(OverlyPermissiveRule),
    ]
}

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

/// A pattern with the message reported for each of its matches
struct Signature {
    regex: Regex,
    message: &'static str,
}

impl Signature {
    fn new(pattern: &str, message: &'static str) -> Self {
        Self {
            regex: regex(pattern),
            message,
        }
    }
}

/// One violation per match of each signature, located by byte offset
fn scan_content(rule: &dyn Rule, file: &SourceFile<'_>, signatures: &[&Signature]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for signature in signatures {
        for found in signature.regex.find_iter(file.content) {
            let line = file.line_of_offset(found.start());
            violations.push(report(rule, file, line, signature.message));
        }
    }
    violations
}

// =============================================================================
// CREDENTIALS
// =============================================================================

static CREDENTIAL_PATTERNS: LazyLock<Vec<Signature>> = LazyLock::new(|| {
    vec![
        Signature::new(
            r#"(?i)(?:password|passwd|pwd)\s*[:=]\s*['"][^'"]{3,}['"]"#,
            "Hardcoded password",
        ),
        Signature::new(
            r#"(?i)(?:api[_-]?key|apikey)\s*[:=]\s*['"][^'"]{8,}['"]"#,
            "Hardcoded API key",
        ),
        Signature::new(
            r#"(?i)(?:secret|token)\s*[:=]\s*['"][^'"]{8,}['"]"#,
            "Hardcoded secret/token",
        ),
        Signature::new(r"(?:sk|pk)[-_](?:live|test)[-_]\w{10,}", "Stripe-style API key"),
        Signature::new(r"ghp_[A-Za-z0-9_]{36,}", "GitHub personal access token"),
        Signature::new(r"AIza[0-9A-Za-z_-]{35}", "Google API key"),
        Signature::new(
            r#"(?i)(?:aws_access_key_id|aws_secret_access_key)\s*[:=]\s*['"][^'"]+['"]"#,
            "AWS credential",
        ),
        Signature::new(r"Bearer\s+[A-Za-z0-9_.-]{20,}", "Hardcoded Bearer token"),
    ]
});

static ENV_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| regex(r"process\.env|os\.environ|std::env|env::var"));

static QUOTED_VALUE: LazyLock<Regex> = LazyLock::new(|| regex(r#"(['"])[^'"]{4}[^'"]*(['"])"#));

/// Flags hardcoded passwords, API keys, and tokens.
///
/// Snippets have their first quoted value masked so reports never echo
/// the secret itself.
pub struct CredentialLeakRule;

impl CredentialLeakRule {
    const META: RuleMeta = RuleMeta {
        id: "no-credential-leak",
        description: "Hardcoded credentials, API keys, and tokens",
        category: RuleCategory::Security,
        severity: Severity::Error,
        extensions: &[
            "ts", "js", "tsx", "jsx", "py", "go", "rs", "env", "json", "yaml", "yml",
        ],
    };

    fn masked(line: &str) -> String {
        QUOTED_VALUE.replace(line.trim(), "${1}****${2}").into_owned()
    }
}

impl Rule for CredentialLeakRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        let path = file.path_str();
        if path.ends_with(".example") || path.ends_with(".template") {
            return Vec::new();
        }

        let mut violations = Vec::new();
        for (idx, line) in file.lines.iter().enumerate() {
            if ENV_REFERENCE.is_match(line) {
                continue;
            }
            for signature in CREDENTIAL_PATTERNS.iter() {
                for found in signature.regex.find_iter(line) {
                    violations.push(
                        Violation::new(
                            self.id(),
                            self.default_severity(),
                            format!("{} detected", signature.message),
                            file.path,
                            idx + 1,
                        )
                        .with_column(column_of(line, found.start()))
                        .with_snippet(Self::masked(line)),
                    );
                }
            }
        }
        violations
    }
}

// =============================================================================
// DYNAMIC EVALUATION
// =============================================================================

static EVAL_PATTERNS: LazyLock<Vec<Signature>> = LazyLock::new(|| {
    vec![
        Signature::new(
            r"\beval\s*\(",
            "eval() is dangerous: AI agents frequently generate it for dynamic behavior",
        ),
        Signature::new(r"\bnew Function\s*\(", "new Function() is equivalent to eval"),
        Signature::new(
            r#"\bsetTimeout\s*\(\s*["'`]"#,
            "setTimeout with string argument acts like eval",
        ),
        Signature::new(
            r#"\bsetInterval\s*\(\s*["'`]"#,
            "setInterval with string argument acts like eval",
        ),
    ]
});

static PY_EXEC: LazyLock<Signature> = LazyLock::new(|| {
    Signature::new(r"\bexec\s*\(", "exec() allows arbitrary code execution")
});

/// Flags `eval`, `new Function`, string timers, and Python `exec`.
pub struct UnsafeEvalRule;

impl UnsafeEvalRule {
    const META: RuleMeta = RuleMeta {
        id: "unsafe-eval",
        description: "eval(), exec(), and similar dynamic code execution",
        category: RuleCategory::Security,
        severity: Severity::Error,
        extensions: JS_PY,
    };
}

impl Rule for UnsafeEvalRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        if is_test_file(file) {
            return Vec::new();
        }
        let mut signatures: Vec<&Signature> = EVAL_PATTERNS.iter().collect();
        if file.extension().as_deref() == Some("py") {
            signatures.insert(2, &PY_EXEC);
        }
        scan_content(self, file, &signatures)
    }
}

// =============================================================================
// SQL INJECTION
// =============================================================================

static SQL_PATTERNS: LazyLock<Vec<Signature>> = LazyLock::new(|| {
    vec![
        Signature::new(
            r"(?i)`[^`]*\b(SELECT|INSERT|UPDATE|DELETE|DROP|CREATE|ALTER)\b[^`]*\$\{[^}]+\}[^`]*`",
            "SQL query uses template literal interpolation: use parameterized queries instead",
        ),
        Signature::new(
            r#"(?i)["'](?:SELECT|INSERT|UPDATE|DELETE|DROP)\b[^"']*["']\s*\+"#,
            "SQL query uses string concatenation: use parameterized queries instead",
        ),
        Signature::new(
            r#"(?i)f["'](?:SELECT|INSERT|UPDATE|DELETE|DROP)\b[^"']*\{[^}]+\}[^"']*["']"#,
            "SQL query uses f-string interpolation: use parameterized queries instead",
        ),
    ]
});

/// Flags SQL text assembled by interpolation or concatenation.
pub struct SqlInjectionRule;

impl SqlInjectionRule {
    const META: RuleMeta = RuleMeta {
        id: "sql-injection",
        description: "String concatenation or interpolation in SQL queries",
        category: RuleCategory::Security,
        severity: Severity::Error,
        extensions: JS_PY,
    };
}

impl Rule for SqlInjectionRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        if is_test_file(file) {
            return Vec::new();
        }
        let signatures: Vec<&Signature> = SQL_PATTERNS.iter().collect();
        scan_content(self, file, &signatures)
    }
}

// =============================================================================
// PERMISSIVE SETTINGS
// =============================================================================

/// A setting that is only suspicious when `context` appears nearby
struct PermissivePattern {
    signature: Signature,
    context: Option<Regex>,
}

impl PermissivePattern {
    fn new(pattern: &str, context: Option<&str>, message: &'static str) -> Self {
        Self {
            signature: Signature::new(pattern, message),
            context: context.map(regex),
        }
    }
}

static PERMISSIVE_PATTERNS: LazyLock<Vec<PermissivePattern>> = LazyLock::new(|| {
    vec![
        PermissivePattern::new(
            r#"(?m)['"]?\*['"]?\s*(?:$|,|\]|\})"#,
            Some(r"(?i)cors|origin|allow"),
            "Wildcard CORS origin (*): restrict to specific domains",
        ),
        PermissivePattern::new(
            r"0\.0\.0\.0",
            Some(r"(?i)listen|host|bind"),
            "Binding to 0.0.0.0: consider restricting to specific interface",
        ),
        PermissivePattern::new(
            r"chmod\s+777",
            None,
            "chmod 777 is world-writable: use restrictive permissions",
        ),
        PermissivePattern::new(
            r"0o?777\b",
            Some(r"(?i)mode|permission"),
            "Permission mode 777 is world-writable",
        ),
        PermissivePattern::new(
            r"(?i)disable.*(?:ssl|tls|certificate|verify)",
            None,
            "Disabling SSL/TLS verification is insecure",
        ),
        PermissivePattern::new(
            r"verify\s*[=:]\s*(?:false|False)",
            None,
            "SSL verification disabled: AI agents often do this to avoid certificate errors",
        ),
        PermissivePattern::new(
            r#"NODE_TLS_REJECT_UNAUTHORIZED.*['"]0['"]"#,
            None,
            "NODE_TLS_REJECT_UNAUTHORIZED=0 disables all TLS verification",
        ),
    ]
});

/// Lines before and after a match searched for context
const CONTEXT_BEFORE: usize = 3;
const CONTEXT_AFTER: usize = 2;

/// Flags wildcard CORS, open binds, world-writable modes, and disabled TLS checks.
pub struct OverlyPermissiveRule;

impl OverlyPermissiveRule {
    const META: RuleMeta = RuleMeta {
        id: "overly-permissive",
        description: "Overly permissive CORS, permissions, and security settings",
        category: RuleCategory::Security,
        severity: Severity::Warning,
        extensions: &["ts", "js", "tsx", "jsx", "py", "json", "yaml", "yml"],
    };
}

impl Rule for OverlyPermissiveRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        if is_test_file(file) {
            return Vec::new();
        }

        let mut violations = Vec::new();
        for pattern in PERMISSIVE_PATTERNS.iter() {
            for found in pattern.signature.regex.find_iter(file.content) {
                let line = file.line_of_offset(found.start());
                if let Some(context) = &pattern.context {
                    let nearby = window(
                        &file.lines,
                        line.saturating_sub(CONTEXT_BEFORE),
                        line + CONTEXT_AFTER,
                    );
                    if !context.is_match(&nearby) {
                        continue;
                    }
                }
                violations.push(report(self, file, line, pattern.signature.message));
            }
        }
        violations
    }
}
