use agentlint::lint::{SourceUnit, UnitOrigin, parse_diff};

#[test]
fn test_additions_number_from_hunk_start() {
    let diff = "+++ b/lib/util.py\n@@ -0,0 +7,3 @@\n+a = 1\n+b = 2\n+c = 3\n";
    let files = parse_diff(diff);

    assert_eq!(files.len(), 1);
    let lines: Vec<usize> = files[0].added_lines.iter().map(|l| l.original_line).collect();
    assert_eq!(lines, vec![7, 8, 9]);
}

#[test]
fn test_context_and_removals() {
    // Example B plus a removal that must not advance the counter
    let diff = "+++ b/src/app.ts\n@@ -10,3 +10,3 @@\n context\n-gone\n+bad line\n context2\n";
    let files = parse_diff(diff);

    assert_eq!(files[0].added_lines.len(), 1);
    assert_eq!(files[0].added_lines[0].text, "bad line");
    assert_eq!(files[0].added_lines[0].original_line, 11);
}

#[test]
fn test_git_diff_across_files_and_hunks() {
    let diff = concat!(
        "diff --git a/a.go b/a.go\n",
        "index 1111111..2222222 100644\n",
        "--- a/a.go\n",
        "+++ b/a.go\n",
        "@@ -1,2 +1,3 @@\n",
        " package main\n",
        "+import \"os\"\n",
        " func main() {}\n",
        "@@ -20,1 +21,2 @@\n",
        " x := 1\n",
        "+y := 2\n",
        "diff --git a/old.go b/old.go\n",
        "deleted file mode 100644\n",
        "--- a/old.go\n",
        "+++ /dev/null\n",
        "@@ -1,1 +0,0 @@\n",
        "-package old\n",
        "diff --git a/b.go b/b.go\n",
        "--- a/b.go\n",
        "+++ b/b.go\n",
        "@@ -5,1 +5,1 @@\n",
        "-old\n",
        "+new\n",
    );
    let files = parse_diff(diff);

    let paths: Vec<_> = files.iter().map(|f| f.path.to_string_lossy().into_owned()).collect();
    assert_eq!(paths, vec!["a.go", "b.go"]);

    let a: Vec<usize> = files[0].added_lines.iter().map(|l| l.original_line).collect();
    assert_eq!(a, vec![2, 22]);
    assert_eq!(files[1].added_lines[0].original_line, 5);
}

#[test]
fn test_units_from_diff_keep_mapping() {
    let diff = "+++ b/x.js\n@@ -3,1 +3,3 @@\n keep\n+one\n+two\n";
    let units: Vec<SourceUnit> = parse_diff(diff).into_iter().map(SourceUnit::from_diff).collect();

    assert_eq!(units[0].content, "one\ntwo");
    match &units[0].origin {
        UnitOrigin::Diff(lines) => {
            assert_eq!(lines.iter().map(|l| l.original_line).collect::<Vec<_>>(), vec![4, 5]);
        }
        UnitOrigin::File => panic!("diff unit lost its origin"),
    }
}

#[test]
fn test_garbage_input_yields_nothing() {
    assert!(parse_diff("not a diff at all\n+stray\n@@ nonsense @@\n").is_empty());
}
