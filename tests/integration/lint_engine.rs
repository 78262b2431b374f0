use std::collections::BTreeSet;

use agentlint::lint::{
    BoxedRule, LintConfig, LintEngine, RuleRegistry, Severity, SourceUnit, parse_diff,
};

use crate::support::{DebugPrintRule, TodoStripRule};

fn custom_registry() -> RuleRegistry {
    let rules: Vec<BoxedRule> = vec![Box::new(DebugPrintRule), Box::new(TodoStripRule)];
    RuleRegistry::new(rules)
}

#[test]
fn test_off_rule_never_reports() {
    // Example C
    let registry = custom_registry();
    let config = LintConfig::new().disable_rule("debug-print");
    let unit = SourceUnit::file(
        "a.c",
        "DEBUG_PRINT(1);\nDEBUG_PRINT(2);\n// TODO later\nDEBUG_PRINT(3);\n",
    );

    let result = LintEngine::new(&registry, &config).run(&[unit]);

    assert_eq!(result.violations.len(), 1);
    assert_eq!(result.violations[0].rule_id, "todo-strip");
    assert_eq!(result.rules_applied, 1);
}

#[test]
fn test_severity_override_changes_only_severity() {
    let registry = custom_registry();
    let unit = SourceUnit::file("a.c", "DEBUG_PRINT(1);\nx();\nDEBUG_PRINT(2);\n");

    let baseline = LintEngine::new(&registry, &LintConfig::new()).run(std::slice::from_ref(&unit));
    let config = LintConfig::new().override_severity("debug-print", Severity::Info);
    let overridden = LintEngine::new(&registry, &config).run(&[unit]);

    assert_eq!(baseline.violations.len(), overridden.violations.len());
    for (before, after) in baseline.violations.iter().zip(&overridden.violations) {
        assert_eq!(before.line, after.line);
        assert_eq!(before.severity, Severity::Error);
        assert_eq!(after.severity, Severity::Info);
    }
    assert!(!overridden.has_errors());
}

#[test]
fn test_results_follow_unit_order() {
    let registry = custom_registry();
    let units: Vec<SourceUnit> = (0..16)
        .map(|i| SourceUnit::file(format!("f{i:02}.c"), "DEBUG_PRINT();\n"))
        .collect();

    let result = LintEngine::new(&registry, &LintConfig::new()).run(&units);

    let files: Vec<String> = result
        .violations
        .iter()
        .map(|v| v.file.display().to_string())
        .collect();
    let expected: Vec<String> = (0..16).map(|i| format!("f{i:02}.c")).collect();
    assert_eq!(files, expected);
    assert_eq!(result.units_scanned, 16);
}

#[test]
fn test_diff_remap_matches_direct_lint() {
    let new_file = concat!(
        "import { load } from \"./load\";\n",
        "\n",
        "export function run(input: any) {\n",
        "  const data = load(input);\n",
        "  console.log(data);\n",
        "  return eval(data.expr);\n",
        "}\n",
    );
    let diff = concat!(
        "+++ b/src/run.ts\n",
        "@@ -1,4 +1,7 @@\n",
        " import { load } from \"./load\";\n",
        " \n",
        "+export function run(input: any) {\n",
        "   const data = load(input);\n",
        "+  console.log(data);\n",
        "+  return eval(data.expr);\n",
        " }\n",
    );
    let line_local = ["no-any-type", "no-console-log", "unsafe-eval"];
    let added: BTreeSet<usize> = [3, 5, 6].into();

    let registry = RuleRegistry::builtin();
    let config = LintConfig::new();
    let engine = LintEngine::new(&registry, &config);

    let direct: BTreeSet<(String, usize)> = engine
        .run(&[SourceUnit::file("src/run.ts", new_file)])
        .violations
        .into_iter()
        .filter(|v| line_local.contains(&v.rule_id.as_str()) && added.contains(&v.line))
        .map(|v| (v.rule_id, v.line))
        .collect();

    let units: Vec<SourceUnit> = parse_diff(diff).into_iter().map(SourceUnit::from_diff).collect();
    let remapped: BTreeSet<(String, usize)> = engine
        .run(&units)
        .violations
        .into_iter()
        .filter(|v| line_local.contains(&v.rule_id.as_str()))
        .map(|v| (v.rule_id, v.line))
        .collect();

    assert_eq!(direct.len(), 3);
    assert_eq!(remapped, direct);
}

#[test]
fn test_extension_scoping() {
    let registry = RuleRegistry::builtin();
    let config = LintConfig::new();
    let engine = LintEngine::new(&registry, &config);

    let go = engine.run(&[SourceUnit::file("main.go", "x := eval(input)\n")]);
    assert!(go.violations.iter().all(|v| v.rule_id != "unsafe-eval"));

    let py = engine.run(&[SourceUnit::file("main.py", "x = eval(data)\n")]);
    assert!(py.violations.iter().any(|v| v.rule_id == "unsafe-eval"));
}
