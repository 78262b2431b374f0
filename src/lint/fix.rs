//! Auto-fix engine: collects line edits from fixable rules and rewrites files.
//!
//! Edits for one file are applied from the highest target line to the lowest
//! against a line buffer. At most one edit lands on any line; the first one
//! met in that order wins and the rest are dropped. Deleting a line only
//! shifts lines above indices still pending, so no queued edit loses its
//! target.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tempfile::NamedTempFile;

use crate::error::{AgentlintError, Result};

use super::config::LintConfig;
use super::diagnostic::Edit;
use super::rule::{Rule, RuleRegistry, SourceFile, unit_extension};

/// Result of applying a batch of edits to one buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub content: String,
    /// Edits that survived conflict resolution and changed their line
    pub applied: usize,
    /// Edits discarded as conflicting or out of range
    pub dropped: usize,
}

/// Apply `edits` to `content`.
///
/// Edits are stable-sorted by line descending, so among edits on the same
/// line the one collected first wins.
#[must_use]
pub fn apply_edits(content: &str, edits: &[Edit]) -> EditOutcome {
    let mut buffer: Vec<String> = content.split('\n').map(str::to_string).collect();
    let mut order: Vec<&Edit> = edits.iter().collect();
    order.sort_by(|a, b| b.line.cmp(&a.line));

    let mut consumed: HashSet<usize> = HashSet::new();
    let mut applied = 0;
    let mut dropped = 0;

    for edit in order {
        let Some(idx) = edit.line.checked_sub(1).filter(|&idx| idx < buffer.len()) else {
            dropped += 1;
            continue;
        };
        if !consumed.insert(idx) {
            dropped += 1;
            continue;
        }
        if apply_one(&mut buffer, idx, edit) {
            applied += 1;
        }
    }

    EditOutcome {
        content: buffer.join("\n"),
        applied,
        dropped,
    }
}

/// Returns whether the buffer changed
fn apply_one(buffer: &mut Vec<String>, idx: usize, edit: &Edit) -> bool {
    if edit.is_deletion() {
        buffer.remove(idx);
        return true;
    }

    let line = &mut buffer[idx];
    if *line == edit.target {
        if *line == edit.replacement {
            return false;
        }
        line.clone_from(&edit.replacement);
        return true;
    }

    if edit.target.is_empty() || edit.target == edit.replacement {
        return false;
    }
    match line.find(&edit.target) {
        Some(pos) => {
            line.replace_range(pos..pos + edit.target.len(), &edit.replacement);
            true
        }
        None => false,
    }
}

/// A file rewritten by the fix pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: PathBuf,
    pub edits_applied: usize,
}

/// A file left untouched because reading or writing it failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a fix pass over a batch of files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixSummary {
    /// Changed files, in input order
    pub changed: Vec<FileChange>,
    pub skipped: Vec<SkippedFile>,
}

impl FixSummary {
    #[must_use]
    pub fn files_changed(&self) -> usize {
        self.changed.len()
    }

    /// Total edits applied across changed files
    #[must_use]
    pub fn edits_applied(&self) -> usize {
        self.changed.iter().map(|c| c.edits_applied).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }
}

enum FileOutcome {
    Unchanged,
    Changed(FileChange),
    Skipped(SkippedFile),
}

/// Runs fixable rules over files and writes the results back
pub struct FixEngine<'a> {
    registry: &'a RuleRegistry,
    config: &'a LintConfig,
}

impl<'a> FixEngine<'a> {
    #[must_use]
    pub const fn new(registry: &'a RuleRegistry, config: &'a LintConfig) -> Self {
        Self { registry, config }
    }

    /// Fixable rules not configured off, in registry order
    pub fn fixable_rules(&self) -> impl Iterator<Item = &'a dyn Rule> + '_ {
        self.registry
            .iter()
            .filter(|rule| rule.can_fix() && !self.config.is_rule_disabled(rule.id()))
    }

    /// Candidate edits for one file, in registry then emission order
    #[must_use]
    pub fn collect_edits(&self, path: &Path, content: &str) -> Vec<Edit> {
        let file = SourceFile::new(path, content);
        let extension = unit_extension(path);
        self.fixable_rules()
            .filter(|rule| rule.applies_to(extension.as_deref()))
            .flat_map(|rule| rule.fix(&file))
            .collect()
    }

    /// Fix `content` in memory
    #[must_use]
    pub fn fix_content(&self, path: &Path, content: &str) -> EditOutcome {
        let edits = self.collect_edits(path, content);
        apply_edits(content, &edits)
    }

    /// Fix every path, isolating per-file I/O failures
    #[must_use]
    pub fn apply(&self, paths: &[PathBuf]) -> FixSummary {
        let mut seen = HashSet::new();
        let unique: Vec<&PathBuf> = paths.iter().filter(|p| seen.insert(*p)).collect();

        let outcomes: Vec<FileOutcome> = unique
            .par_iter()
            .map(|path| self.fix_file(path))
            .collect();

        let mut summary = FixSummary::default();
        for outcome in outcomes {
            match outcome {
                FileOutcome::Unchanged => {}
                FileOutcome::Changed(change) => summary.changed.push(change),
                FileOutcome::Skipped(skipped) => summary.skipped.push(skipped),
            }
        }
        summary
    }

    fn fix_file(&self, path: &Path) -> FileOutcome {
        let skipped = |err: AgentlintError| {
            FileOutcome::Skipped(SkippedFile {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })
        };

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => return skipped(AgentlintError::io(path, err)),
        };

        let outcome = self.fix_content(path, &content);
        if outcome.content == content {
            return FileOutcome::Unchanged;
        }

        match write_atomic(path, &outcome.content) {
            Ok(()) => FileOutcome::Changed(FileChange {
                path: path.to_path_buf(),
                edits_applied: outcome.applied,
            }),
            Err(err) => skipped(err),
        }
    }
}

/// Replace `path` with `content` through a sibling temp file.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let permissions = fs::metadata(path)
        .map_err(|e| AgentlintError::io(path, e))?
        .permissions();

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| AgentlintError::io(dir, e))?;
    temp.write_all(content.as_bytes())
        .and_then(|()| temp.flush())
        .map_err(|e| AgentlintError::io(temp.path(), e))?;
    temp.as_file()
        .set_permissions(permissions)
        .map_err(|e| AgentlintError::io(temp.path(), e))?;
    temp.persist(path)
        .map_err(|e| AgentlintError::io(path, e.error))?;
    Ok(())
}
