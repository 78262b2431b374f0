use std::path::Path;

use agentlint::lint::{BoxedRule, Edit, FixEngine, LintConfig, RuleRegistry, apply_edits};
use agentlint::test_utils::ProjectFixture;

use crate::support::{DebugPrintRule, TodoStripRule};

fn custom_registry() -> RuleRegistry {
    let rules: Vec<BoxedRule> = vec![Box::new(DebugPrintRule), Box::new(TodoStripRule)];
    RuleRegistry::new(rules)
}

#[test]
fn test_same_line_conflict_applies_one_edit() {
    // Example A
    let registry = custom_registry();
    let config = LintConfig::new();
    let engine = FixEngine::new(&registry, &config);
    let path = Path::new("a.c");
    let content = "a\nDEBUG_PRINT(x) // TODO\nb";

    let edits = engine.collect_edits(path, content);
    assert_eq!(edits.len(), 2);

    let outcome = engine.fix_content(path, content);
    assert_eq!(outcome.applied, 1);
    assert_eq!(outcome.dropped, 1);
    // Registry order puts the deletion first, so it wins
    assert_eq!(outcome.content, "a\nb");
}

#[test]
fn test_deletion_below_replacement() {
    let path = Path::new("a.ts");
    let content = "keep TODO\nmiddle\nremove me\ntail";
    let edits = vec![
        Edit::delete_line(path, 3, "remove me"),
        Edit::replace(path, 1, "TODO", "DONE"),
    ];

    let outcome = apply_edits(content, &edits);

    assert_eq!(outcome.content, "keep DONE\nmiddle\ntail");
    assert_eq!(outcome.applied, 2);
}

#[test]
fn test_builtin_fixes_are_idempotent() {
    let registry = RuleRegistry::builtin();
    let config = LintConfig::new();
    let engine = FixEngine::new(&registry, &config);
    let path = Path::new("src/handler.ts");
    let content = concat!(
        "const a = 1;\n",
        "console.log(a);\n",
        "function f(x: any): any[] {\n",
        "  try {\n",
        "    run();\n",
        "  } catch (e) {}\n",
        "  return [x as any];\n",
        "}\n",
        "// FIXME remove\n",
        "const b = 2; // TODO tidy\n",
    );

    let first = engine.fix_content(path, content);
    assert!(first.applied >= 6, "applied {}", first.applied);
    assert_eq!(first.dropped, 0);

    assert!(engine.collect_edits(path, &first.content).is_empty());
    let second = engine.fix_content(path, &first.content);
    assert_eq!(second.applied, 0);
    assert_eq!(second.content, first.content);
}

#[test]
fn test_apply_writes_only_changed_files() {
    let fixture = ProjectFixture::new();
    let dirty = fixture.create_file("src/dirty.js", "console.log(1);\nrun();\n");
    let clean = fixture.create_file("src/clean.js", "run();\n");

    let registry = RuleRegistry::builtin();
    let config = LintConfig::new();
    let summary = FixEngine::new(&registry, &config).apply(&[dirty.clone(), clean, dirty]);

    assert_eq!(summary.files_changed(), 1);
    assert_eq!(summary.edits_applied(), 1);
    assert_eq!(fixture.read("src/dirty.js"), "run();\n");
    assert_eq!(fixture.read("src/clean.js"), "run();\n");
}

#[test]
fn test_apply_skips_unreadable_files() {
    let fixture = ProjectFixture::new();
    let good = fixture.create_file("good.js", "console.log(1);\n");
    let missing = fixture.path("missing.js");

    let registry = RuleRegistry::builtin();
    let config = LintConfig::new();
    let summary = FixEngine::new(&registry, &config).apply(&[missing.clone(), good]);

    assert_eq!(summary.files_changed(), 1);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].path, missing);
    assert_eq!(fixture.read("good.js"), "");
}

#[test]
fn test_disabled_rule_is_not_fixed() {
    let registry = custom_registry();
    let config = LintConfig::new().disable_rule("debug-print");
    let engine = FixEngine::new(&registry, &config);

    let outcome = engine.fix_content(Path::new("a.c"), "DEBUG_PRINT(x) // TODO");

    assert_eq!(outcome.content, "DEBUG_PRINT(x) // DONE");
}

#[test]
fn test_console_fix_leaves_shared_lines_intact() {
    let registry = RuleRegistry::builtin();
    let config = LintConfig::new();
    let engine = FixEngine::new(&registry, &config);
    let content = "function f(a) {\n  console.log(a); return a * 2;\n}\n";

    let outcome = engine.fix_content(Path::new("x.js"), content);

    assert_eq!(outcome.content, content);
    assert_eq!(outcome.applied, 0);
}
