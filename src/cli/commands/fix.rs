//! agentlint --fix - Apply auto-fixes in place
//!
//! Files that cannot be read or written are skipped with a warning; the
//! run itself still succeeds.

use console::style;
use tracing::{info, warn};

use crate::app::AppContext;
use crate::cli::Cli;
use crate::error::Result;
use crate::lint::{FixEngine, FixSummary, collect_files};
use crate::output::{display_path, render_fix_summary};

pub fn run(ctx: &AppContext, cli: &Cli) -> Result<()> {
    let summary = fix_path(ctx, &cli.path)?;

    for skipped in &summary.skipped {
        warn!(path = %skipped.path.display(), reason = %skipped.reason, "fix skipped");
        eprintln!(
            "{} skipped {}: {}",
            style("warning:").yellow().bold(),
            display_path(&skipped.path, &ctx.cwd),
            skipped.reason
        );
    }

    println!("{}", render_fix_summary(&summary, &ctx.cwd));
    Ok(())
}

/// Fix every lintable file under `path`
pub fn fix_path(ctx: &AppContext, path: &std::path::Path) -> Result<FixSummary> {
    let target = ctx.resolve(path);
    let files = collect_files(&target, &ctx.config)?;
    let summary = FixEngine::new(&ctx.registry, &ctx.config).apply(&files);
    info!(
        files = files.len(),
        changed = summary.files_changed(),
        edits = summary.edits_applied(),
        "fix complete"
    );
    Ok(summary)
}
