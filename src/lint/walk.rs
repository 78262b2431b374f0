//! Unit discovery: filesystem walking and file loading.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

use crate::error::{AgentlintError, Result};

use super::config::LintConfig;
use super::engine::SourceUnit;
use super::rule::unit_extension;

/// Extensions scanned when the config does not name any
pub const DEFAULT_EXTENSIONS: [&str; 11] = [
    ".ts", ".tsx", ".js", ".jsx", ".py", ".go", ".rs", ".json", ".yaml", ".yml", ".env",
];

/// Entry names never descended into
pub const DEFAULT_IGNORE: [&str; 9] = [
    "node_modules",
    "dist",
    "build",
    ".git",
    ".next",
    "coverage",
    "__pycache__",
    ".venv",
    "vendor",
];

/// Effective walker filters for one run
struct WalkFilter {
    names: HashSet<String>,
    patterns: Vec<Pattern>,
    extensions: HashSet<String>,
}

impl WalkFilter {
    fn new(config: &LintConfig) -> Self {
        let mut names: HashSet<String> = DEFAULT_IGNORE.iter().map(ToString::to_string).collect();
        let mut patterns = Vec::new();

        for entry in &config.ignore {
            let entry = entry.trim_end_matches('/');
            if entry.is_empty() {
                continue;
            }
            names.insert(entry.to_string());
            match Pattern::new(entry) {
                Ok(pattern) => patterns.push(pattern),
                Err(err) => debug!("ignore entry '{entry}' is not a glob: {err}"),
            }
        }

        let extensions = config.extensions.as_ref().map_or_else(
            || DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
            |exts| exts.iter().cloned().collect(),
        );

        Self {
            names,
            patterns,
            extensions,
        }
    }

    fn is_ignored(&self, entry: &DirEntry, root: &Path) -> bool {
        if entry.depth() == 0 {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        if self.names.contains(name.as_ref()) {
            return true;
        }
        if name.starts_with('.') && !name.starts_with(".env") {
            return true;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        self.patterns
            .iter()
            .any(|p| p.matches(&name) || p.matches_path(relative))
    }

    fn wants(&self, path: &Path) -> bool {
        unit_extension(path).is_some_and(|ext| self.extensions.contains(&format!(".{ext}")))
    }
}

/// Files under `target` that should be linted, in walk order.
///
/// A file target is returned as-is regardless of filters.
pub fn collect_files(target: &Path, config: &LintConfig) -> Result<Vec<PathBuf>> {
    let metadata = fs::metadata(target).map_err(|err| AgentlintError::io(target, err))?;
    if metadata.is_file() {
        return Ok(vec![target.to_path_buf()]);
    }

    let filter = WalkFilter::new(config);
    let mut files = Vec::new();

    let walker = WalkDir::new(target)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !filter.is_ignored(entry, target));

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && filter.wants(entry.path()) {
            trace!(path = %entry.path().display(), "collected");
            files.push(entry.into_path());
        }
    }

    debug!(count = files.len(), root = %target.display(), "collected files");
    Ok(files)
}

/// Read each path into a whole-file unit
pub fn load_units(paths: &[PathBuf]) -> Result<Vec<SourceUnit>> {
    paths
        .iter()
        .map(|path| {
            fs::read_to_string(path)
                .map(|content| SourceUnit::file(path.clone(), content))
                .map_err(|err| AgentlintError::io(path, err))
        })
        .collect()
}
