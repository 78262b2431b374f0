//! Go rules.
//!
//! Every rule here skips `_test.go` files and `//` comment lines.

use std::sync::LazyLock;

use regex::Regex;

use crate::lint::diagnostic::{RuleCategory, Severity, Violation};
use crate::lint::rule::{BoxedRule, Rule, RuleMeta, SourceFile};

use super::{column_of, is_go_test_file, is_line_comment, preceded_by_word, report, window};

const GO: &[&str] = &["go"];

/// Returns all Go rules.
pub fn go_rules() -> Vec<BoxedRule> {
    vec![
        Box::new(GoErrorIgnoredRule),
        Box::new(GoDeferInLoopRule),
        Box::new(GoGoroutineLeakRule),
        Box::new(GoNilCheckMissingRule),
        Box::new(GoBareReturnRule),
        Box::new(GoInitFunctionRule),
    ]
}

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

/// Non-comment lines of a non-test Go file, 0-based
fn code_lines<'f>(file: &'f SourceFile<'_>) -> impl Iterator<Item = (usize, &'f str)> {
    let skip = is_go_test_file(file);
    file.lines
        .iter()
        .enumerate()
        .filter(move |(_, line)| !skip && !is_line_comment(line))
        .map(|(idx, line)| (idx, *line))
}

// =============================================================================
// IGNORED ERRORS
// =============================================================================

static BLANK_ASSIGN: LazyLock<Regex> = LazyLock::new(|| regex(r",\s*_\s*:?="));
static CALL: LazyLock<Regex> = LazyLock::new(|| regex(r"\w+\s*\("));
static STATEMENT_CALL: LazyLock<Regex> =
    LazyLock::new(|| regex(r"^\s+(\w+(?:\.\w+)*)\s*\([^)]*\)\s*$"));
static ERR_WORD: LazyLock<Regex> = LazyLock::new(|| regex(r"\berr\b"));

/// Calls whose results are conventionally dropped
const NO_ERROR_CALLS: &[&str] = &[
    "fmt.Print", "fmt.Println", "fmt.Printf", "panic", "append", "len", "cap", "make", "new",
    "close", "delete", "copy", "recover",
];

/// Lines after a bare call searched for an `err` reference
const ERR_LOOKAHEAD: usize = 2;

/// Flags errors discarded with `_` and calls whose results are dropped.
pub struct GoErrorIgnoredRule;

impl GoErrorIgnoredRule {
    const META: RuleMeta = RuleMeta {
        id: "go-error-ignored",
        description: "Ignored error returns (blank identifier or unchecked call)",
        category: RuleCategory::Go,
        severity: Severity::Error,
        extensions: GO,
    };

    fn returns_nothing(name: &str) -> bool {
        NO_ERROR_CALLS.contains(&name) || name.starts_with("log.")
    }
}

impl Rule for GoErrorIgnoredRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (idx, line) in code_lines(file) {
            if let Some(blank) = BLANK_ASSIGN.find(line) {
                if CALL.is_match(line) {
                    violations.push(
                        report(
                            self,
                            file,
                            idx + 1,
                            "Error return value ignored with blank identifier `_`",
                        )
                        .with_column(column_of(line, blank.start())),
                    );
                }
            }

            let Some(caps) = STATEMENT_CALL.captures(line) else {
                continue;
            };
            let name = &caps[1];
            let statement = line.trim_start();
            if Self::returns_nothing(name)
                || statement.starts_with("go ")
                || statement.starts_with("defer ")
            {
                continue;
            }
            let following = window(&file.lines, idx + 1, idx + 1 + ERR_LOOKAHEAD);
            if !ERR_WORD.is_match(&following) {
                violations.push(report(
                    self,
                    file,
                    idx + 1,
                    format!("Return value of {name}() likely ignored: check for errors"),
                ));
            }
        }

        violations
    }
}

// =============================================================================
// DEFER IN LOOP
// =============================================================================

static FOR_HEADER: LazyLock<Regex> = LazyLock::new(|| regex(r"^\s*for\s"));
static DEFER_STMT: LazyLock<Regex> = LazyLock::new(|| regex(r"^\s*defer\s"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Loop,
    Block,
}

/// Flags `defer` statements inside `for` bodies.
pub struct GoDeferInLoopRule;

impl GoDeferInLoopRule {
    const META: RuleMeta = RuleMeta {
        id: "go-defer-in-loop",
        description: "defer inside for loops runs at function exit",
        category: RuleCategory::Go,
        severity: Severity::Error,
        extensions: GO,
    };
}

impl Rule for GoDeferInLoopRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut scopes: Vec<Scope> = Vec::new();
        // A `for` header whose opening brace has not been seen yet
        let mut loop_pending = false;

        for (idx, line) in code_lines(file) {
            if FOR_HEADER.is_match(line) {
                loop_pending = true;
            }
            for ch in line.chars() {
                match ch {
                    '{' if loop_pending => {
                        scopes.push(Scope::Loop);
                        loop_pending = false;
                    }
                    '{' => scopes.push(Scope::Block),
                    '}' => {
                        scopes.pop();
                    }
                    _ => {}
                }
            }

            if DEFER_STMT.is_match(line) && scopes.contains(&Scope::Loop) {
                violations.push(report(
                    self,
                    file,
                    idx + 1,
                    "defer inside for loop: deferred calls execute at function exit, not loop iteration end",
                ));
            }
        }

        violations
    }
}

// =============================================================================
// GOROUTINE LEAKS
// =============================================================================

static SYNC_PRIMITIVE: LazyLock<Regex> = LazyLock::new(|| {
    regex(
        r"\b(?:sync\.WaitGroup|context\.WithCancel|context\.WithTimeout|context\.WithDeadline|errgroup)\b|\bchan\s|\bselect\s*\{|<-ctx\.Done\b",
    )
});

static GO_STMT: LazyLock<Regex> = LazyLock::new(|| regex(r"\bgo\s+(?:func\s*\(|[a-zA-Z_]\w*\s*\()"));

/// Flags goroutines in files with no sync primitive or cancellation at all.
pub struct GoGoroutineLeakRule;

impl GoGoroutineLeakRule {
    const META: RuleMeta = RuleMeta {
        id: "go-goroutine-leak",
        description: "Goroutines launched without sync primitives or cancellation",
        category: RuleCategory::Go,
        severity: Severity::Warning,
        extensions: GO,
    };
}

impl Rule for GoGoroutineLeakRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        if SYNC_PRIMITIVE.is_match(file.content) {
            return Vec::new();
        }
        code_lines(file)
            .filter(|(_, line)| GO_STMT.is_match(line))
            .map(|(idx, _)| {
                report(
                    self,
                    file,
                    idx + 1,
                    "Goroutine launched without visible sync/context: potential goroutine leak",
                )
            })
            .collect()
    }
}

// =============================================================================
// NIL CHECKS
// =============================================================================

static RESULT_ERR_ASSIGN: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(\w+)\s*,\s*(\w+)\s*:?=\s*\w+"));
static ERR_CHECK: LazyLock<Regex> = LazyLock::new(|| regex(r"\bif\s+err\s*!=\s*nil\b"));

/// Lines after the assignment searched for a use or an err check
const USE_LOOKAHEAD: usize = 4;

/// Flags results dereferenced before the paired `err` is checked.
pub struct GoNilCheckMissingRule;

impl GoNilCheckMissingRule {
    const META: RuleMeta = RuleMeta {
        id: "go-nil-check-missing",
        description: "Result used before checking err",
        category: RuleCategory::Go,
        severity: Severity::Error,
        extensions: GO,
    };

    /// Whether `var` is dereferenced before an `if err != nil`
    fn used_before_check(lines: &[&str], var: &str) -> bool {
        for line in lines {
            if ERR_CHECK.is_match(line) {
                return false;
            }
            if Self::dereferences(line, var) {
                return true;
            }
        }
        false
    }

    /// `var` as a whole word followed by optional whitespace and a `.`
    fn dereferences(line: &str, var: &str) -> bool {
        line.match_indices(var).any(|(idx, _)| {
            !preceded_by_word(line, idx) && line[idx + var.len()..].trim_start().starts_with('.')
        })
    }
}

impl Rule for GoNilCheckMissingRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (idx, line) in code_lines(file) {
            let Some(caps) = RESULT_ERR_ASSIGN.captures(line) else {
                continue;
            };
            if &caps[2] != "err" {
                continue;
            }
            let var = &caps[1];
            let end = (idx + 1 + USE_LOOKAHEAD).min(file.lines.len());
            let following = &file.lines[(idx + 1).min(end)..end];
            if Self::used_before_check(following, var) {
                violations.push(report(
                    self,
                    file,
                    idx + 1,
                    format!("'{var}' used before checking 'err': may dereference nil pointer"),
                ));
            }
        }

        violations
    }
}

// =============================================================================
// BARE RETURNS
// =============================================================================

static NAMED_RESULT_FUNC: LazyLock<Regex> = LazyLock::new(|| {
    regex(r"\bfunc\s+(?:\([^)]*\)\s*)?\w+\s*\([^)]*\)\s*\((\w+\s+\w+(?:\s*,\s*\w+\s+\w+)*)\)\s*\{")
});

/// Flags naked `return` in functions with named results.
pub struct GoBareReturnRule;

impl GoBareReturnRule {
    const META: RuleMeta = RuleMeta {
        id: "go-bare-return",
        description: "Naked returns in functions with named results",
        category: RuleCategory::Go,
        severity: Severity::Warning,
        extensions: GO,
    };

    /// 0-based line holding the brace that closes the body opened on `start`
    fn body_end(lines: &[&str], start: usize) -> Option<usize> {
        let mut depth = 0i64;
        let mut opened = false;
        for (idx, line) in lines.iter().enumerate().skip(start) {
            for ch in line.chars() {
                match ch {
                    '{' => {
                        depth += 1;
                        opened = true;
                    }
                    '}' => depth -= 1,
                    _ => {}
                }
            }
            if opened && depth == 0 {
                return Some(idx);
            }
        }
        None
    }
}

impl Rule for GoBareReturnRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        if is_go_test_file(file) {
            return Vec::new();
        }
        let mut violations = Vec::new();

        for found in NAMED_RESULT_FUNC.find_iter(file.content) {
            let header = file.line_of_offset(found.start()) - 1;
            let Some(end) = Self::body_end(&file.lines, header) else {
                continue;
            };
            for idx in header + 1..end {
                let text = file.lines[idx].trim();
                if text == "return" {
                    violations.push(report(
                        self,
                        file,
                        idx + 1,
                        "Naked return in function with named return values: reduces readability",
                    ));
                }
            }
        }

        violations
    }
}

// =============================================================================
// INIT FUNCTIONS
// =============================================================================

static INIT_FUNC: LazyLock<Regex> = LazyLock::new(|| regex(r"^\s*func\s+init\s*\(\s*\)\s*\{"));

/// Flags package `init()` functions.
pub struct GoInitFunctionRule;

impl GoInitFunctionRule {
    const META: RuleMeta = RuleMeta {
        id: "go-init-function",
        description: "init() functions hide initialization",
        category: RuleCategory::Go,
        severity: Severity::Warning,
        extensions: GO,
    };
}

impl Rule for GoInitFunctionRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation> {
        code_lines(file)
            .filter(|(_, line)| INIT_FUNC.is_match(line))
            .map(|(idx, _)| {
                report(
                    self,
                    file,
                    idx + 1,
                    "init() function: prefer explicit initialization for clarity and testability",
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn check(rule: &dyn Rule, path: &str, content: &str) -> Vec<Violation> {
        rule.check(&SourceFile::new(Path::new(path), content))
    }

    #[test]
    fn test_error_ignored_blank_identifier() {
        let v = check(&GoErrorIgnoredRule, "main.go", "val, _ := strconv.Atoi(input)");
        assert_eq!(v.len(), 1);
        assert!(v[0].message.contains("blank identifier"));
        assert_eq!(v[0].column, Some(4));

        assert_eq!(check(&GoErrorIgnoredRule, "main.go", "result, _ = json.Marshal(data)").len(), 1);
        assert!(check(&GoErrorIgnoredRule, "main_test.go", "val, _ := strconv.Atoi(input)").is_empty());
        assert!(check(&GoErrorIgnoredRule, "main.go", "// val, _ := strconv.Atoi(input)").is_empty());
    }

    #[test]
    fn test_error_ignored_statement_call() {
        let code = "func run() {\n\tfile.Sync()\n\tfmt.Println(\"done\")\n\tlog.Printf(\"x\")\n}";
        let v = check(&GoErrorIgnoredRule, "main.go", code);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].line, 2);
        assert_eq!(v[0].message, "Return value of file.Sync() likely ignored: check for errors");

        let checked = "func run() {\n\tdoThing()\n\tif err != nil {\n\t}\n}";
        assert!(check(&GoErrorIgnoredRule, "main.go", checked).is_empty());
    }

    #[test]
    fn test_defer_in_loop() {
        let code = "for _, f := range files {\n    file, err := os.Open(f)\n    defer file.Close()\n}";
        let v = check(&GoDeferInLoopRule, "main.go", code);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].line, 3);
        assert!(v[0].message.contains("defer inside for loop"));

        let outside = "file, err := os.Open(name)\ndefer file.Close()\nfor _, line := range lines {\n    process(line)\n}";
        assert!(check(&GoDeferInLoopRule, "main.go", outside).is_empty());

        let test_file = "for i := 0; i < 10; i++ {\n    defer cleanup()\n}";
        assert!(check(&GoDeferInLoopRule, "main_test.go", test_file).is_empty());
    }

    #[test]
    fn test_defer_after_nested_block_in_loop() {
        let code = "for _, f := range files {\n    if f == \"\" {\n        continue\n    }\n    defer close(f)\n}\ndefer done()";
        let v = check(&GoDeferInLoopRule, "main.go", code);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].line, 5);
    }

    #[test]
    fn test_goroutine_leak() {
        let bare = "func handler() {\n    go processRequest(data)\n}";
        let v = check(&GoGoroutineLeakRule, "main.go", bare);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].line, 2);

        let closure = "func main() {\n    go func() {\n        doWork()\n    }()\n}";
        assert_eq!(check(&GoGoroutineLeakRule, "main.go", closure).len(), 1);

        let waitgroup = "func handler() {\n    var wg sync.WaitGroup\n    wg.Add(1)\n    go func() {\n        defer wg.Done()\n    }()\n    wg.Wait()\n}";
        assert!(check(&GoGoroutineLeakRule, "main.go", waitgroup).is_empty());

        let cancel = "func handler() {\n    ctx, cancel := context.WithCancel(context.Background())\n    defer cancel()\n    go processRequest(ctx, data)\n}";
        assert!(check(&GoGoroutineLeakRule, "main.go", cancel).is_empty());

        let select = "func loop() {\n    go worker()\n    select {\n    }\n}";
        assert!(check(&GoGoroutineLeakRule, "main.go", select).is_empty());

        assert!(check(&GoGoroutineLeakRule, "main_test.go", "go processRequest(data)").is_empty());
    }

    #[test]
    fn test_nil_check_missing() {
        let v = check(&GoNilCheckMissingRule, "main.go", "result, err := getUser(id)\nresult.Name = \"test\"");
        assert_eq!(v.len(), 1);
        assert!(v[0].message.contains("'result'"));
        assert_eq!(v[0].line, 1);

        let checked = "result, err := getUser(id)\nif err != nil {\n    return nil, err\n}\nresult.Name = \"test\"";
        assert!(check(&GoNilCheckMissingRule, "main.go", checked).is_empty());

        assert!(
            check(&GoNilCheckMissingRule, "main_test.go", "result, err := getUser(id)\nresult.Name = \"test\"")
                .is_empty()
        );
    }

    #[test]
    fn test_nil_check_matches_whole_identifier() {
        let lines = ["myresp.Body.Close()", "resps.Len()"];
        assert!(!GoNilCheckMissingRule::used_before_check(&lines, "resp"));
        assert!(GoNilCheckMissingRule::used_before_check(&["x := resp .Body"], "resp"));
        assert!(GoNilCheckMissingRule::used_before_check(&["defer resp.Body.Close()"], "resp"));
        assert!(!GoNilCheckMissingRule::used_before_check(
            &["if err != nil {", "resp.Body.Close()"],
            "resp"
        ));
    }

    #[test]
    fn test_bare_return() {
        let code = "func divide(a, b int) (result int, err error) {\n    if b == 0 {\n        err = errors.New(\"division by zero\")\n        return\n    }\n    result = a / b\n    return\n}";
        let v = check(&GoBareReturnRule, "main.go", code);
        let lines: Vec<usize> = v.iter().map(|v| v.line).collect();
        assert_eq!(lines, vec![4, 7]);
        assert!(v[0].message.contains("Naked return"));

        let explicit = "func divide(a, b int) (int, error) {\n    if b == 0 {\n        return 0, errors.New(\"x\")\n    }\n    return a / b, nil\n}";
        assert!(check(&GoBareReturnRule, "main.go", explicit).is_empty());

        let helper = "func helper() (result int, err error) {\n    return\n}";
        assert!(check(&GoBareReturnRule, "main_test.go", helper).is_empty());
    }

    #[test]
    fn test_init_function() {
        let v = check(&GoInitFunctionRule, "main.go", "func init() {\n    db = connectDB()\n}");
        assert_eq!(v.len(), 1);
        assert!(v[0].message.contains("init()"));

        assert!(check(&GoInitFunctionRule, "main.go", "func initialize() {\n}").is_empty());
        assert!(check(&GoInitFunctionRule, "main.go", "// func init() {").is_empty());
        assert!(check(&GoInitFunctionRule, "setup_test.go", "func init() {\n}").is_empty());
    }
}
