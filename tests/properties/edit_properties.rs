use std::path::Path;

use proptest::prelude::*;

use agentlint::lint::{Edit, apply_edits};

fn arb_content() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z ]{0,12}", 1..20)
}

fn arb_edit(max_line: usize) -> impl Strategy<Value = Edit> {
    (0..=max_line + 1, prop::bool::ANY, "[a-z]{0,3}", "[A-Z]{1,3}").prop_map(
        |(line, delete, target, replacement)| {
            let path = Path::new("f.txt");
            if delete {
                Edit::delete_line(path, line, "")
            } else {
                Edit::replace(path, line, target, replacement)
            }
        },
    )
}

proptest! {
    #[test]
    fn test_at_most_one_edit_per_line(
        (lines, edits) in arb_content().prop_flat_map(|lines| {
            let n = lines.len();
            (Just(lines), prop::collection::vec(arb_edit(n), 0..30))
        })
    ) {
        let content = lines.join("\n");
        let outcome = apply_edits(&content, &edits);

        let mut targets: Vec<usize> = edits.iter().map(|e| e.line).collect();
        targets.sort_unstable();
        targets.dedup();
        let in_range = targets.iter().filter(|&&l| l >= 1 && l <= lines.len()).count();

        prop_assert!(outcome.applied <= in_range);
        prop_assert!(outcome.applied + outcome.dropped <= edits.len());
        prop_assert!(outcome.content.split('\n').count() <= lines.len());
    }

    #[test]
    fn test_deletions_only_remove_targeted_lines(
        (lines, doomed) in arb_content().prop_flat_map(|lines| {
            let n = lines.len();
            (Just(lines), prop::collection::btree_set(1..=n, 0..n))
        })
    ) {
        let path = Path::new("f.txt");
        let edits: Vec<Edit> = doomed
            .iter()
            .map(|&line| Edit::delete_line(path, line, &lines[line - 1]))
            .collect();

        let outcome = apply_edits(&lines.join("\n"), &edits);

        let survivors: Vec<&str> = lines
            .iter()
            .enumerate()
            .filter(|(idx, _)| !doomed.contains(&(idx + 1)))
            .map(|(_, line)| line.as_str())
            .collect();
        prop_assert_eq!(outcome.content, survivors.join("\n"));
        prop_assert_eq!(outcome.applied, doomed.len());
    }
}
