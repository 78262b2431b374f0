//! Rule trait, rule registry, and the source view rules observe.

use std::borrow::Cow;
use std::path::Path;

use super::diagnostic::{Edit, RuleCategory, Severity, Violation};

/// Static description of a rule
#[derive(Debug, Clone, Copy)]
pub struct RuleMeta {
    /// Unique identifier (e.g. "no-console-log")
    pub id: &'static str,
    /// What the rule detects
    pub description: &'static str,
    pub category: RuleCategory,
    pub severity: Severity,
    /// Extensions (without dot) the rule applies to; empty means all
    pub extensions: &'static [&'static str],
}

/// The text a rule inspects: a real file, or the added lines of a diff.
pub struct SourceFile<'a> {
    pub path: &'a Path,
    pub content: &'a str,
    pub lines: Vec<&'a str>,
}

impl<'a> SourceFile<'a> {
    #[must_use]
    pub fn new(path: &'a Path, content: &'a str) -> Self {
        Self {
            path,
            content,
            lines: content.split('\n').collect(),
        }
    }

    /// Path rendered for message text and suffix checks
    #[must_use]
    pub fn path_str(&self) -> Cow<'_, str> {
        self.path.to_string_lossy()
    }

    /// Final path component
    #[must_use]
    pub fn file_name(&self) -> Cow<'_, str> {
        self.path
            .file_name()
            .map_or(Cow::Borrowed(""), |name| name.to_string_lossy())
    }

    #[must_use]
    pub fn extension(&self) -> Option<String> {
        unit_extension(self.path)
    }

    /// 1-based line containing byte `offset` of `content`
    #[must_use]
    pub fn line_of_offset(&self, offset: usize) -> usize {
        let end = offset.min(self.content.len());
        self.content.as_bytes()[..end]
            .iter()
            .filter(|&&b| b == b'\n')
            .count()
            + 1
    }

    /// Trimmed text of a 1-based line, if it exists
    #[must_use]
    pub fn snippet(&self, line: usize) -> Option<String> {
        line.checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map(|text| text.trim().to_string())
    }
}

/// Extension used for rule and walker matching, without the dot.
///
/// `.env` and `.env.*` files map to `env`.
#[must_use]
pub fn unit_extension(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    if name == ".env" || name.starts_with(".env.") {
        return Some("env".to_string());
    }
    path.extension()
        .map(|ext| ext.to_string_lossy().into_owned())
}

/// A lint rule that checks source text for one pattern class.
///
/// Rules are stateless: `check` and `fix` see only the `SourceFile` they are
/// given and never perform I/O.
pub trait Rule: Send + Sync {
    fn meta(&self) -> &RuleMeta;

    /// Run the check
    fn check(&self, file: &SourceFile<'_>) -> Vec<Violation>;

    /// Can this rule auto-fix issues?
    fn can_fix(&self) -> bool {
        false
    }

    /// Propose edits for the file (only meaningful when `can_fix` is true)
    fn fix(&self, _file: &SourceFile<'_>) -> Vec<Edit> {
        Vec::new()
    }

    fn id(&self) -> &'static str {
        self.meta().id
    }

    fn description(&self) -> &'static str {
        self.meta().description
    }

    fn category(&self) -> RuleCategory {
        self.meta().category
    }

    fn default_severity(&self) -> Severity {
        self.meta().severity
    }

    fn extensions(&self) -> &'static [&'static str] {
        self.meta().extensions
    }

    /// Whether a unit with this extension is in scope
    fn applies_to(&self, extension: Option<&str>) -> bool {
        let exts = self.extensions();
        exts.is_empty() || extension.is_some_and(|ext| exts.contains(&ext))
    }
}

/// A boxed rule for dynamic dispatch
pub type BoxedRule = Box<dyn Rule>;

/// Immutable, ordered set of rules assembled once at startup.
pub struct RuleRegistry {
    rules: Vec<BoxedRule>,
}

impl RuleRegistry {
    #[must_use]
    pub fn new(rules: Vec<BoxedRule>) -> Self {
        Self { rules }
    }

    /// Registry with every built-in rule
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(super::rules::all_rules())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|rule| &**rule)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&dyn Rule> {
        self.iter().find(|rule| rule.id() == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
