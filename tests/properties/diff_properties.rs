use proptest::prelude::*;

use agentlint::lint::parse_diff;

#[derive(Debug, Clone, Copy)]
enum HunkLine {
    Added,
    Removed,
    Context,
}

fn arb_hunk() -> impl Strategy<Value = Vec<HunkLine>> {
    prop::collection::vec(
        prop_oneof![
            Just(HunkLine::Added),
            Just(HunkLine::Removed),
            Just(HunkLine::Context),
        ],
        0..40,
    )
}

proptest! {
    #[test]
    fn test_parse_diff_never_panics(input in ".*") {
        let _ = parse_diff(&input);
    }

    #[test]
    fn test_consecutive_additions_number_from_start(start in 1usize..5000, k in 1usize..30) {
        let mut diff = format!("+++ b/f.ts\n@@ -0,0 +{start},{k} @@\n");
        for i in 0..k {
            diff.push_str(&format!("+line {i}\n"));
        }

        let files = parse_diff(&diff);
        prop_assert_eq!(files.len(), 1);
        let numbers: Vec<usize> = files[0].added_lines.iter().map(|l| l.original_line).collect();
        let expected: Vec<usize> = (start..start + k).collect();
        prop_assert_eq!(numbers, expected);
    }

    #[test]
    fn test_added_lines_track_new_file_position(start in 1usize..1000, hunk in arb_hunk()) {
        let mut diff = format!("+++ b/f.py\n@@ -1,1 +{start},1 @@\n");
        let mut expected = Vec::new();
        let mut new_line = start;
        for (i, kind) in hunk.iter().enumerate() {
            match kind {
                HunkLine::Added => {
                    diff.push_str(&format!("+added {i}\n"));
                    expected.push((new_line, format!("added {i}")));
                    new_line += 1;
                }
                HunkLine::Removed => diff.push_str(&format!("-removed {i}\n")),
                HunkLine::Context => {
                    diff.push_str(&format!(" context {i}\n"));
                    new_line += 1;
                }
            }
        }

        let files = parse_diff(&diff);
        let actual: Vec<(usize, String)> = files[0]
            .added_lines
            .iter()
            .map(|l| (l.original_line, l.text.clone()))
            .collect();
        prop_assert_eq!(actual, expected);
    }
}
