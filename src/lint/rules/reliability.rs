//! Reliability rules.
//!
//! Error handling gaps, unbounded work, missing timeouts, and resources that
//! are opened but never released.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::lint::diagnostic::{Edit, RuleCategory, Severity, Violation};
use crate::lint::rule::{BoxedRule, Rule, RuleMeta, SourceFile};

use super::{extract_block, is_test_file, preceded_by_word, report, window};

const JS: &[&str] = &["ts", "js", "tsx", "jsx"];
const JS_PY: &[&str] = &["ts", "js", "tsx", "jsx", "py"];

/// Returns all reliability rules.
pub fn reliability_rules() -> Vec<BoxedRule> {
    vec![
        Box::new(UnhandledAsyncRule),
        Box::new(UnboundedQueryRule),
        Box::new(InputValidationRule),
        Box::new(RetryLogicRule),
        Box::new(SyncFsRule),
        Box::new(EmptyCatchRule),
        Box::new(TimeoutRule),
        Box::new(UnboundedLoopRule),
        Box::new(ResourceLeakRule),
    ]
}

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

// =============================================================================
// ASYNC ERROR HANDLING
// =============================================================================

static ASYNC_FN: LazyLock<Regex> = LazyLock::new(|| regex(r"async\s+(?:function\s+)?(\w+)?\s*\("));

/// Minimum body length before an unguarded async function is reported
const TRIVIAL_BODY_LEN: usize = 50;

/// Lines searched for a `.catch(` after a `.then(`
const CATCH_LOOKAHEAD: usize = 5;

/// Flags async functions without try/catch and `.then()` chains without `.catch()`.
pub struct UnhandledAsyncRule;

impl UnhandledAsyncRule {
    const META: RuleMeta = RuleMeta {
        id: "no-unhandled-async",
        description: "Async without try/catch or .catch()",
        category: RuleCategory::Reliability,
        severity: Severity::Warning,
        extensions: JS,
    };
}

impl Rule for UnhandledAsyncRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for caps in ASYNC_FN.captures_iter(file.content) {
            let Some(whole) = caps.get(0) else { continue };
            let Some(body) = extract_block(file.content, whole.start()) else {
                continue;
            };
            if body.contains("try") || body.contains(".catch(") || body.len() <= TRIVIAL_BODY_LEN {
                continue;
            }
            let name = caps
                .get(1)
                .map(|m| format!(" \"{}\"", m.as_str()))
                .unwrap_or_default();
            violations.push(report(
                self,
                file,
                file.line_of_offset(whole.start()),
                format!("Async function{name} has no try/catch or .catch() error handling"),
            ));
        }

        for (idx, line) in file.lines.iter().enumerate() {
            if !line.contains(".then(") || line.contains(".catch(") {
                continue;
            }
            if !window(&file.lines, idx, idx + CATCH_LOOKAHEAD).contains(".catch(") {
                violations.push(report(
                    self,
                    file,
                    idx + 1,
                    ".then() without .catch(): unhandled promise rejection",
                ));
            }
        }

        violations
    }
}

// =============================================================================
// UNBOUNDED QUERIES
// =============================================================================

/// A call shape, optionally excused when the match is followed by `unless`
struct QueryPattern {
    regex: Regex,
    unless: Option<Regex>,
    message: &'static str,
}

impl QueryPattern {
    fn new(pattern: &str, unless: Option<&str>, message: &'static str) -> Self {
        Self {
            regex: regex(pattern),
            unless: unless.map(regex),
            message,
        }
    }

    fn is_match(&self, line: &str) -> bool {
        self.regex.find_iter(line).any(|m| {
            self.unless
                .as_ref()
                .is_none_or(|unless| !unless.is_match(&line[m.end()..]))
        })
    }
}

static QUERY_PATTERNS: LazyLock<Vec<QueryPattern>> = LazyLock::new(|| {
    vec![
        QueryPattern::new(
            r"\.find\(\s*\{\s*\}\s*\)",
            None,
            "Unbounded .find({}): missing limit/pagination",
        ),
        QueryPattern::new(r"\.findMany\(\s*\)", None, "Unbounded .findMany(): missing take/skip"),
        QueryPattern::new(
            r"(?i)SELECT\s+\*\s+FROM\s+\w+",
            Some(r"(?i)^\s+(?:WHERE|LIMIT)\b"),
            "SELECT * without WHERE/LIMIT",
        ),
        QueryPattern::new(r"\.getAll\(\s*\)", None, "Unbounded .getAll(): missing pagination"),
        QueryPattern::new(r"\.list\(\s*\)", None, ".list() without pagination parameters"),
    ]
});

/// Flags queries and list calls with no limit or pagination.
pub struct UnboundedQueryRule;

impl UnboundedQueryRule {
    const META: RuleMeta = RuleMeta {
        id: "no-unbounded-query",
        description: "Database queries without pagination",
        category: RuleCategory::Reliability,
        severity: Severity::Warning,
        extensions: JS_PY,
    };
}

impl Rule for UnboundedQueryRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (idx, line) in file.lines.iter().enumerate() {
            for pattern in QUERY_PATTERNS.iter().filter(|p| p.is_match(line)) {
                violations.push(report(self, file, idx + 1, pattern.message));
            }
        }
        violations
    }
}

// =============================================================================
// INPUT VALIDATION
// =============================================================================

static HANDLERS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        regex(r#"\.(get|post|put|patch|delete)\s*\(\s*['"`]"#),
        regex(r"app\.(get|post|put|patch|delete)\s*\("),
        regex(r"router\.(get|post|put|patch|delete)\s*\("),
    ]
});

static VALIDATION_HINTS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        regex(r"zod|yup|joi|validate|schema|safeParse|parse\(|ajv|superstruct"),
        regex(r"typeof\s+\w+\s*[!=]=="),
        regex(r"if\s*\(\s*!\s*\w+"),
    ]
});

/// Bytes after a handler start searched for validation
const HANDLER_LOOKAHEAD: usize = 500;

/// Flags HTTP route handlers with no visible input validation.
pub struct InputValidationRule;

impl InputValidationRule {
    const META: RuleMeta = RuleMeta {
        id: "no-input-validation",
        description: "HTTP handlers without input validation",
        category: RuleCategory::Reliability,
        severity: Severity::Warning,
        extensions: JS,
    };

    fn handler_body(content: &str, start: usize) -> &str {
        let mut end = (start + HANDLER_LOOKAHEAD).min(content.len());
        while !content.is_char_boundary(end) {
            end -= 1;
        }
        &content[start..end]
    }
}

impl Rule for InputValidationRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        // Handler patterns overlap; report each line once
        let mut lines = BTreeSet::new();
        for pattern in HANDLERS.iter() {
            for m in pattern.find_iter(file.content) {
                let body = Self::handler_body(file.content, m.start());
                if !VALIDATION_HINTS.iter().any(|hint| hint.is_match(body)) {
                    lines.insert(file.line_of_offset(m.start()));
                }
            }
        }
        lines
            .into_iter()
            .map(|line| report(self, file, line, "HTTP handler without input validation"))
            .collect()
    }
}

// =============================================================================
// RETRIES AND TIMEOUTS
// =============================================================================

static RETRY_MECHANISM: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(?i)retry|backoff|attempt|maxRetries|exponential"));

static HTTP_CALLS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        regex(r"\bfetch\s*\("),
        regex(r"axios\.\w+\s*\("),
        regex(r"\.request\s*\("),
        regex(r"http\.\w+\s*\("),
    ]
});

/// Flags HTTP calls in files with no retry or backoff anywhere.
pub struct RetryLogicRule;

impl RetryLogicRule {
    const META: RuleMeta = RuleMeta {
        id: "no-retry-logic",
        description: "HTTP calls without retry/backoff",
        category: RuleCategory::Reliability,
        severity: Severity::Info,
        extensions: JS,
    };
}

impl Rule for RetryLogicRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        if is_test_file(file) || RETRY_MECHANISM.is_match(file.content) {
            return Vec::new();
        }
        HTTP_CALLS
            .iter()
            .flat_map(|pattern| pattern.find_iter(file.content))
            .map(|m| {
                report(
                    self,
                    file,
                    file.line_of_offset(m.start()),
                    format!("HTTP call without retry/backoff logic: \"{}\"", m.as_str().trim()),
                )
            })
            .collect()
    }
}

static TIMEOUT_CONFIG: LazyLock<Regex> =
    LazyLock::new(|| regex(r"timeout|AbortSignal|signal\s*:"));

static FETCH_CALL: LazyLock<Regex> = LazyLock::new(|| regex(r"\bfetch\s*\("));

/// Flags `fetch()` in files that never configure a timeout or abort signal.
pub struct TimeoutRule;

impl TimeoutRule {
    const META: RuleMeta = RuleMeta {
        id: "no-timeout",
        description: "Network calls without timeout",
        category: RuleCategory::Reliability,
        severity: Severity::Warning,
        extensions: JS,
    };
}

impl Rule for TimeoutRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        if is_test_file(file) || TIMEOUT_CONFIG.is_match(file.content) {
            return Vec::new();
        }
        FETCH_CALL
            .find_iter(file.content)
            .map(|m| {
                report(
                    self,
                    file,
                    file.line_of_offset(m.start()),
                    "fetch() without timeout/AbortSignal: can hang indefinitely",
                )
            })
            .collect()
    }
}

// =============================================================================
// SYNCHRONOUS FILESYSTEM
// =============================================================================

const SYNC_CALLS: [&str; 8] = [
    "readFileSync",
    "writeFileSync",
    "existsSync",
    "mkdirSync",
    "readdirSync",
    "statSync",
    "unlinkSync",
    "copyFileSync",
];

static SYNC_CALL: LazyLock<Regex> =
    LazyLock::new(|| regex(&format!(r"\b(?:{})\b", SYNC_CALLS.join("|"))));

static CLI_OR_CONFIG: LazyLock<Regex> = LazyLock::new(|| regex(r"(?:cli|config)\.[tj]s$"));

/// Flags blocking `fs.*Sync` calls outside CLI entry points and config files.
pub struct SyncFsRule;

impl SyncFsRule {
    const META: RuleMeta = RuleMeta {
        id: "no-sync-fs",
        description: "Synchronous file system operations",
        category: RuleCategory::Reliability,
        severity: Severity::Warning,
        extensions: JS,
    };
}

impl Rule for SyncFsRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        if CLI_OR_CONFIG.is_match(&file.path_str()) {
            return Vec::new();
        }

        let mut violations = Vec::new();
        for (idx, line) in file.lines.iter().enumerate() {
            let found: BTreeSet<&str> = SYNC_CALL.find_iter(line).map(|m| m.as_str()).collect();
            // One report per distinct call, in declaration order
            for call in SYNC_CALLS.iter().filter(|call| found.contains(*call)) {
                violations.push(report(
                    self,
                    file,
                    idx + 1,
                    format!("Synchronous {call} blocks the event loop; use the async version"),
                ));
            }
        }
        violations
    }
}

// =============================================================================
// EMPTY CATCH
// =============================================================================

static EMPTY_CATCH: LazyLock<Regex> =
    LazyLock::new(|| regex(r"catch\s*(\([^)]*\))\s*\{\s*\}"));

/// Flags catch blocks with an empty body.
///
/// Fix: fills single-line empty catch blocks with a comment so the swallow
/// is explicit.
pub struct EmptyCatchRule;

impl EmptyCatchRule {
    const META: RuleMeta = RuleMeta {
        id: "no-empty-catch",
        description: "Empty catch blocks that swallow errors",
        category: RuleCategory::Reliability,
        severity: Severity::Error,
        extensions: JS,
    };
}

impl Rule for EmptyCatchRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        EMPTY_CATCH
            .find_iter(file.content)
            .map(|m| {
                report(
                    self,
                    file,
                    file.line_of_offset(m.start()),
                    "Empty catch block silently swallows errors",
                )
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
            .filter_map(|(idx, line)| {
                let caps = EMPTY_CATCH.captures(line)?;
                let whole = caps.get(0)?.as_str();
                let binding = caps.get(1)?.as_str();
                Some(Edit::replace(
                    file.path,
                    idx + 1,
                    whole,
                    format!("catch {binding} {{ /* error intentionally ignored */ }}"),
                ))
            })
            .collect()
    }
}

// =============================================================================
// UNBOUNDED LOOPS
// =============================================================================

static INFINITE_LOOPS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (
            regex(r"\bwhile\s*\(\s*true\s*\)"),
            "while(true) without obvious bound: ensure a break/return condition exists",
        ),
        (
            regex(r"\bwhile\s*\(\s*1\s*\)"),
            "while(1) infinite loop: use an explicit condition instead",
        ),
        (
            regex(r"\bfor\s*\(\s*;\s*;\s*\)"),
            "for(;;) infinite loop: ensure an exit condition exists",
        ),
        (
            regex(r"\bwhile\s+True\s*:"),
            "while True: without obvious bound: ensure a break condition exists",
        ),
    ]
});

static LOOP_EXIT: LazyLock<Regex> = LazyLock::new(|| regex(r"\b(?:break|return)\b"));

/// Lines, starting at the loop header, searched for an exit
const LOOP_EXIT_WINDOW: usize = 20;

/// Flags infinite loops with no break or return nearby.
pub struct UnboundedLoopRule;

impl UnboundedLoopRule {
    const META: RuleMeta = RuleMeta {
        id: "unbounded-loop",
        description: "while(true)/for(;;) without break",
        category: RuleCategory::Reliability,
        severity: Severity::Warning,
        extensions: JS_PY,
    };
}

impl Rule for UnboundedLoopRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        if is_test_file(file) {
            return Vec::new();
        }

        let mut violations = Vec::new();
        for (pattern, message) in INFINITE_LOOPS.iter() {
            for m in pattern.find_iter(file.content) {
                let line = file.line_of_offset(m.start());
                let body = window(&file.lines, line - 1, line - 1 + LOOP_EXIT_WINDOW);
                if !LOOP_EXIT.is_match(&body) {
                    violations.push(report(self, file, line, *message));
                }
            }
        }
        violations
    }
}

// =============================================================================
// RESOURCE LEAKS
// =============================================================================

static STREAM_OPEN: LazyLock<Regex> =
    LazyLock::new(|| regex(r"\bcreate(?:Read|Write)Stream\s*\("));

static STREAM_CLEANUP: LazyLock<Regex> =
    LazyLock::new(|| regex(r"\.close\(\)|\.destroy\(\)|pipeline|\.pipe\("));

/// Connection constructors paired with the cleanup call that releases them
static CONNECTIONS: LazyLock<[(Regex, Regex); 3]> = LazyLock::new(|| {
    [
        (regex(r"new\s+Database\s*\("), regex(r"\.close\(\)")),
        (regex(r"createConnection\s*\("), regex(r"\.(?:close|end|destroy)\(\)")),
        (regex(r"createPool\s*\("), regex(r"\.(?:end|destroy)\(\)")),
    ]
});

static PY_OPEN: LazyLock<Regex> = LazyLock::new(|| regex(r"open\s*\("));

/// Flags streams, connections, and Python file handles opened without cleanup.
pub struct ResourceLeakRule;

impl ResourceLeakRule {
    const META: RuleMeta = RuleMeta {
        id: "resource-leak",
        description: "Streams/connections without close",
        category: RuleCategory::Reliability,
        severity: Severity::Warning,
        extensions: JS_PY,
    };
}

impl Rule for ResourceLeakRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        if is_test_file(file) {
            return Vec::new();
        }
        let content = file.content;
        let mut violations = Vec::new();

        if !STREAM_CLEANUP.is_match(content) {
            for m in STREAM_OPEN.find_iter(content) {
                violations.push(report(
                    self,
                    file,
                    file.line_of_offset(m.start()),
                    "Stream created without .close(), .destroy(), or pipeline: may leak file descriptors",
                ));
            }
        }

        for (open, closer) in CONNECTIONS.iter() {
            if closer.is_match(content) {
                continue;
            }
            for m in open.find_iter(content) {
                violations.push(report(
                    self,
                    file,
                    file.line_of_offset(m.start()),
                    format!(
                        "Resource opened with {} but no close/cleanup found in file",
                        m.as_str().trim()
                    ),
                ));
            }
        }

        if file.extension().as_deref() == Some("py") {
            for m in PY_OPEN.find_iter(content) {
                if preceded_by_word(content, m.start()) {
                    continue;
                }
                let line = file.line_of_offset(m.start());
                let text = file.lines.get(line - 1).copied().unwrap_or_default();
                if text.contains("with ") || text.contains(".close()") {
                    continue;
                }
                violations.push(report(
                    self,
                    file,
                    line,
                    "open() without context manager (with statement): file handle may leak",
                ));
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::fix::apply_edits;
    use std::path::Path;

    fn check(rule: &dyn Rule, path: &str, content: &str) -> Vec<Violation> {
        rule.check(&SourceFile::new(Path::new(path), content))
    }

    #[test]
    fn test_unhandled_async() {
        let code = "async function loadUsers() {\n  const res = await fetch(url);\n  return await res.json();\n}";
        let v = check(&UnhandledAsyncRule, "a.ts", code);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].message, "Async function \"loadUsers\" has no try/catch or .catch() error handling");

        let guarded = "async function loadUsers() {\n  try {\n    return await fetch(url);\n  } catch (e) { throw e; }\n}";
        assert!(check(&UnhandledAsyncRule, "a.ts", guarded).is_empty());

        let then = "fetch(a).then(r => r.json())\n\n\n\n\n\nfetch(b).then(x)\n  .catch(log)";
        let v = check(&UnhandledAsyncRule, "a.js", then);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].line, 1);
    }

    #[test]
    fn test_unbounded_query() {
        assert_eq!(check(&UnboundedQueryRule, "a.ts", "const all = await db.find({})").len(), 1);
        assert_eq!(check(&UnboundedQueryRule, "a.ts", r#"const q = "SELECT * FROM users""#).len(), 1);
        assert!(check(&UnboundedQueryRule, "a.py", "q = 'select * from users where id = 1'").is_empty());
        assert!(check(&UnboundedQueryRule, "a.ts", "db.users.findMany({ take: 10 })").is_empty());
    }

    #[test]
    fn test_input_validation() {
        let code = "app.post('/users', async (req, res) => {\n  const user = await db.create(req.body);\n  res.json(user);\n});";
        let v = check(&InputValidationRule, "routes.ts", code);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].line, 1);

        let validated = "app.post('/users', async (req, res) => {\n  const body = schema.parse(req.body);\n});";
        assert!(check(&InputValidationRule, "routes.ts", validated).is_empty());
    }

    #[test]
    fn test_retry_logic() {
        let v = check(&RetryLogicRule, "api.ts", "const r = await fetch(url);\naxios.get(u);");
        let messages: Vec<_> = v.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "HTTP call without retry/backoff logic: \"fetch(\"",
                "HTTP call without retry/backoff logic: \"axios.get(\"",
            ]
        );
        assert!(check(&RetryLogicRule, "api.ts", "withRetry(() => fetch(url));").is_empty());
    }

    #[test]
    fn test_timeout() {
        assert_eq!(check(&TimeoutRule, "a.ts", "await fetch(url);").len(), 1);
        assert!(check(&TimeoutRule, "a.ts", "await fetch(url, { signal: s });").is_empty());
        assert!(check(&TimeoutRule, "a.spec.ts", "await fetch(url);").is_empty());
    }

    #[test]
    fn test_sync_fs() {
        let v = check(
            &SyncFsRule,
            "src/load.ts",
            "if (existsSync(p)) { readFileSync(p); readFileSync(q); }",
        );
        assert_eq!(v.len(), 2);
        assert!(v[0].message.contains("readFileSync"));
        assert!(v[1].message.contains("existsSync"));
        assert!(check(&SyncFsRule, "src/cli.ts", "readFileSync(p)").is_empty());
    }

    #[test]
    fn test_empty_catch_check_and_fix() {
        let code = "try { x() } catch (error) {}\ntry {\n  y()\n} catch (e) {\n}";
        let v = check(&EmptyCatchRule, "a.ts", code);
        let lines: Vec<_> = v.iter().map(|v| v.line).collect();
        assert_eq!(lines, vec![1, 4]);

        let file = SourceFile::new(Path::new("a.ts"), code);
        let edits = EmptyCatchRule.fix(&file);
        assert_eq!(edits.len(), 1);
        let fixed = apply_edits(code, &edits).content;
        assert!(fixed.starts_with("try { x() } catch (error) { /* error intentionally ignored */ }"));

        let again = EmptyCatchRule.fix(&SourceFile::new(Path::new("a.ts"), &fixed));
        assert!(again.is_empty());
    }

    #[test]
    fn test_unbounded_loop() {
        let v = check(&UnboundedLoopRule, "worker.py", "while True:\n    poll()\n");
        assert_eq!(v.len(), 1);
        assert!(v[0].message.starts_with("while True:"));
        assert!(check(&UnboundedLoopRule, "w.ts", "while (true) {\n  if (done) break;\n}").is_empty());
        assert_eq!(check(&UnboundedLoopRule, "w.ts", "for (;;) {\n  tick();\n}").len(), 1);
    }

    #[test]
    fn test_resource_leak() {
        let v = check(&ResourceLeakRule, "a.ts", "const s = fs.createReadStream(p);\nconst db = new Database(f);");
        assert_eq!(v.len(), 2);
        assert_eq!(v[1].message, "Resource opened with new Database( but no close/cleanup found in file");
        assert!(check(&ResourceLeakRule, "a.ts", "const s = createReadStream(p);\ns.pipe(out);").is_empty());

        let py = "f = open('x')\nwith open('y') as g:\n    pass\nreopen(z)";
        let v = check(&ResourceLeakRule, "a.py", py);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].line, 1);
    }
}
