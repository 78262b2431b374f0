//! agentlint - Production-readiness checker for agent-generated code
//!
//! Exit codes: 0 clean, 1 error-severity violations, 2 usage or runtime failure.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use agentlint::app::AppContext;
use agentlint::cli::Cli;
use agentlint::{AgentlintError, Result};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    if std::env::var_os("NO_COLOR").is_some() {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(AgentlintError::ViolationsFound(_)) => ExitCode::from(1),
        Err(e) => {
            eprintln!("agentlint error: {e}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let ctx = AppContext::from_cli(cli)?;
    agentlint::cli::commands::run(&ctx, cli)
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
