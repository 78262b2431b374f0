//! CLI command implementations
//!
//! The command line has one mode per invocation:
//! - `--explain` / `--list-rules`: rule catalogue (`rules`)
//! - `--fix`: rewrite files in place (`fix`)
//! - default: lint a tree or a diff from stdin (`lint`)

pub mod fix;
pub mod lint;
pub mod rules;

use crate::app::AppContext;
use crate::cli::Cli;
use crate::error::Result;

/// Dispatch to the handler selected by the flags
pub fn run(ctx: &AppContext, cli: &Cli) -> Result<()> {
    if let Some(rule_id) = &cli.explain {
        return rules::explain(ctx, rule_id);
    }
    if cli.list_rules {
        return rules::list(ctx);
    }
    if cli.fix {
        return fix::run(ctx, cli);
    }
    lint::run(ctx, cli)
}
