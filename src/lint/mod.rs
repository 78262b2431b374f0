//! Pattern linting over files and diffs, with line-level auto-fixes.
//!
//! This module provides:
//!
//! - `Rule` trait and `RuleRegistry` holding the built-in detectors
//! - `LintEngine` for running enabled rules over `SourceUnit`s
//! - `parse_diff` for turning a unified diff into added-line units
//! - `FixEngine` for applying rule edits to files on disk
//! - `LintConfig` for per-rule overrides, ignores, and extensions
//!
//! # Example
//!
//! ```
//! use agentlint::lint::{LintConfig, LintEngine, RuleRegistry, Severity, SourceUnit, parse_diff};
//!
//! let diff = "+++ b/src/app.ts\n@@ -10,2 +10,3 @@\n const a = 1;\n+eval(input);\n const b = 2;\n";
//! let units: Vec<SourceUnit> = parse_diff(diff).into_iter().map(SourceUnit::from_diff).collect();
//!
//! let registry = RuleRegistry::builtin();
//! let config = LintConfig::new().override_severity("unsafe-eval", Severity::Warning);
//! let result = LintEngine::new(&registry, &config).run(&units);
//!
//! let finding = result
//!     .violations
//!     .iter()
//!     .find(|v| v.rule_id == "unsafe-eval")
//!     .unwrap();
//! assert_eq!(finding.line, 11);
//! assert_eq!(finding.severity, Severity::Warning);
//! ```

pub mod config;
pub mod diagnostic;
pub mod diff;
pub mod engine;
pub mod fix;
pub mod rule;
pub mod rules;
pub mod walk;

// Re-export main types for convenience
pub use config::{LintConfig, RuleSetting};
pub use diagnostic::{Edit, RuleCategory, Severity, Violation};
pub use diff::{AddedLine, DiffFile, parse_diff};
pub use engine::{LintEngine, LintResult, RuleInfo, SourceUnit, UnitOrigin};
pub use fix::{EditOutcome, FileChange, FixEngine, FixSummary, SkippedFile, apply_edits};
pub use rule::{BoxedRule, Rule, RuleMeta, RuleRegistry, SourceFile};
pub use walk::{collect_files, load_units};

// Re-export rule collection functions
pub use rules::all_rules;
