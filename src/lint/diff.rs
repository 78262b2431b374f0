//! Recovery of added lines and their new-file line numbers from unified diffs.
//!
//! The mapper is a two-state scanner: the section currently being filled
//! (path plus added lines) and the running new-file line counter. Malformed
//! input never fails; it just yields fewer files or lines.

use std::path::PathBuf;

/// One line present only in the new version of a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedLine {
    /// Line text without the leading `+`
    pub text: String,
    /// 1-based line number in the new file
    pub original_line: usize,
}

/// Added lines for one file touched by a diff, in diff order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffFile {
    pub path: PathBuf,
    pub added_lines: Vec<AddedLine>,
}

impl DiffFile {
    /// Synthetic blob rules observe: the added texts joined by newlines.
    ///
    /// Line `n` of this blob is `added_lines[n - 1]`.
    #[must_use]
    pub fn synthetic_content(&self) -> String {
        self.added_lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Parse a unified diff into one entry per touched file.
///
/// Files appear in first-seen order; a path seen in several sections is
/// merged into its first entry.
#[must_use]
pub fn parse_diff(input: &str) -> Vec<DiffFile> {
    let mut mapper = DiffMapper::default();
    for raw in input.split('\n') {
        mapper.feed(raw.strip_suffix('\r').unwrap_or(raw));
    }
    mapper.finish()
}

#[derive(Default)]
struct DiffMapper {
    files: Vec<DiffFile>,
    /// Section being accumulated, if a `+++ b/` header opened one
    current: Option<DiffFile>,
    /// New-file line number of the next non-removed line
    line: usize,
    /// New-side lines the current hunk header still promises
    hunk_remaining: usize,
}

impl DiffMapper {
    fn feed(&mut self, line: &str) {
        // Inside a hunk every `+` line is content, even one that looks like a header
        if let Some(text) = line.strip_prefix('+').filter(|_| self.hunk_remaining > 0) {
            self.hunk_remaining -= 1;
            self.record(text);
            return;
        }

        if let Some(target) = line.strip_prefix("+++ ") {
            self.flush();
            self.current = section_path(target).map(|path| DiffFile {
                path,
                added_lines: Vec::new(),
            });
            self.line = 1;
            self.hunk_remaining = 0;
            return;
        }

        if let Some((start, count)) = hunk_new_range(line) {
            self.line = start;
            self.hunk_remaining = count;
            return;
        }

        if line.starts_with('\\') {
            return;
        }

        if let Some(text) = line.strip_prefix('+') {
            self.record(text);
        } else if !line.starts_with('-') {
            self.hunk_remaining = self.hunk_remaining.saturating_sub(1);
            self.line += 1;
        }
    }

    fn record(&mut self, text: &str) {
        if let Some(section) = self.current.as_mut() {
            section.added_lines.push(AddedLine {
                text: text.to_string(),
                original_line: self.line,
            });
        }
        self.line += 1;
    }

    fn flush(&mut self) {
        let Some(section) = self.current.take() else {
            return;
        };
        match self.files.iter_mut().find(|f| f.path == section.path) {
            Some(existing) => existing.added_lines.extend(section.added_lines),
            None => self.files.push(section),
        }
    }

    fn finish(mut self) -> Vec<DiffFile> {
        self.flush();
        self.files
    }
}

/// Path named by a `+++` header; `None` for `/dev/null` or a bare header.
fn section_path(target: &str) -> Option<PathBuf> {
    // Drop a tab-separated timestamp if present
    let target = target.split('\t').next().unwrap_or(target).trim_end();
    let path = target.strip_prefix("b/")?;
    (!path.is_empty()).then(|| PathBuf::from(path))
}

/// New-file start and line count from `@@ -a[,b] +c[,d] @@`; `d` defaults to 1
fn hunk_new_range(line: &str) -> Option<(usize, usize)> {
    let rest = line.strip_prefix("@@ -")?;
    let (old, rest) = rest.split_once(' ')?;
    let mut old_parts = old.splitn(2, ',');
    let valid_count = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !old_parts.next().is_some_and(valid_count) || !old_parts.next().is_none_or(valid_count) {
        return None;
    }
    let new = rest.strip_prefix('+')?;
    let (start, rest) = split_number(new)?;
    let count = match rest.strip_prefix(',') {
        Some(count) => split_number(count)?.0,
        None => 1,
    };
    Some((start, count))
}

/// Leading decimal number and the text after it
fn split_number(text: &str) -> Option<(usize, &str)> {
    let len = text.bytes().take_while(u8::is_ascii_digit).count();
    let value = text[..len].parse().ok()?;
    Some((value, &text[len..]))
}
