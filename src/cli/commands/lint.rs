//! agentlint [PATH] - Lint a directory, a file, or a diff from stdin
//!
//! Prints the report in the selected format and fails with
//! `ViolationsFound` when any error-severity violation remains.

use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::app::AppContext;
use crate::cli::Cli;
use crate::error::{AgentlintError, Result};
use crate::lint::{LintEngine, LintResult, SourceUnit, collect_files, load_units, parse_diff};
use crate::output::{self, OutputFormat, display_path};

pub fn run(ctx: &AppContext, cli: &Cli) -> Result<()> {
    let units = if cli.stdin {
        diff_units(std::io::stdin().lock())?
    } else {
        file_units(ctx, &cli.path)?
    };

    let mut result = lint_units(ctx, &units);
    if cli.errors_only {
        result.retain_errors();
    }

    let rendered = output::render(ctx.output_format, &result, &ctx.registry)?;
    match ctx.output_format {
        OutputFormat::Human => print!("{rendered}"),
        OutputFormat::Json | OutputFormat::Sarif => println!("{rendered}"),
    }

    if result.has_errors() {
        Err(AgentlintError::ViolationsFound(result.error_count()))
    } else {
        Ok(())
    }
}

/// Run the engine and express violation paths relative to the working directory
pub fn lint_units(ctx: &AppContext, units: &[SourceUnit]) -> LintResult {
    let mut result = LintEngine::new(&ctx.registry, &ctx.config).run(units);
    for violation in &mut result.violations {
        violation.file = display_path(&violation.file, &ctx.cwd).into();
    }
    info!(
        units = result.units_scanned,
        violations = result.violations.len(),
        duration_ms = result.duration_ms,
        "lint complete"
    );
    result
}

/// Walk `path` and load every matching file
pub fn file_units(ctx: &AppContext, path: &Path) -> Result<Vec<SourceUnit>> {
    let target = ctx.resolve(path);
    let files = collect_files(&target, &ctx.config)?;
    load_units(&files)
}

/// One unit per file touched by the diff read from `reader`
pub fn diff_units(mut reader: impl Read) -> Result<Vec<SourceUnit>> {
    let mut diff = String::new();
    reader
        .read_to_string(&mut diff)
        .map_err(|err| AgentlintError::Input(format!("read diff from stdin: {err}")))?;

    let files = parse_diff(&diff);
    debug!(files = files.len(), "parsed diff");
    Ok(files.into_iter().map(SourceUnit::from_diff).collect())
}
