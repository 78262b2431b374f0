//! Result presenters.
//!
//! - **Human** (`human`): violations grouped by file, styled with `console`
//! - **JSON** (`json`): violations plus a camelCase summary block
//! - **SARIF** (`sarif`): SARIF 2.1.0 log for code-scanning upload
//!
//! The fix summary is plain text and lives here.

pub mod human;
pub mod json;
pub mod sarif;

use std::path::{Component, Path};

use clap::ValueEnum;

use crate::error::Result;
use crate::lint::{FixSummary, LintResult, RuleRegistry};

/// Output format for lint results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON for programmatic consumption
    Json,
    /// SARIF 2.1.0 for code scanning
    Sarif,
}

/// Render a lint result in `format`
pub fn render(format: OutputFormat, result: &LintResult, registry: &RuleRegistry) -> Result<String> {
    match format {
        OutputFormat::Human => Ok(human::render(result)),
        OutputFormat::Json => json::render(result),
        OutputFormat::Sarif => sarif::render(result, registry),
    }
}

/// Text reported after `--fix`; paths are shown relative to `cwd`
#[must_use]
pub fn render_fix_summary(summary: &FixSummary, cwd: &Path) -> String {
    if summary.is_empty() {
        return "No auto-fixable violations found.".to_string();
    }

    let mut lines = vec![format!(
        "Fixed {} file(s) ({} edit(s) applied):",
        summary.files_changed(),
        summary.edits_applied()
    )];
    lines.extend(
        summary
            .changed
            .iter()
            .map(|change| format!("  {}", display_path(&change.path, cwd))),
    );
    lines.join("\n")
}

/// `path` relative to `cwd` when below it, without a leading `./`
#[must_use]
pub fn display_path(path: &Path, cwd: &Path) -> String {
    let relative = path.strip_prefix(cwd).unwrap_or(path);
    let trimmed: std::path::PathBuf = relative
        .components()
        .skip_while(|c| matches!(c, Component::CurDir))
        .collect();
    trimmed.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::{FileChange, SkippedFile};
    use std::path::PathBuf;

    #[test]
    fn test_fix_summary_text() {
        let cwd = Path::new("/work");
        assert_eq!(
            render_fix_summary(&FixSummary::default(), cwd),
            "No auto-fixable violations found."
        );

        let summary = FixSummary {
            changed: vec![
                FileChange {
                    path: PathBuf::from("/work/src/a.ts"),
                    edits_applied: 2,
                },
                FileChange {
                    path: PathBuf::from("./lib/b.js"),
                    edits_applied: 1,
                },
            ],
            skipped: vec![SkippedFile {
                path: PathBuf::from("/work/c.ts"),
                reason: "denied".into(),
            }],
        };
        assert_eq!(
            render_fix_summary(&summary, cwd),
            "Fixed 2 file(s) (3 edit(s) applied):\n  src/a.ts\n  lib/b.js"
        );
    }

    #[test]
    fn test_display_path() {
        assert_eq!(display_path(Path::new("./src/x.rs"), Path::new("/tmp")), "src/x.rs");
        assert_eq!(display_path(Path::new("/other/x.rs"), Path::new("/tmp")), "/other/x.rs");
    }
}
