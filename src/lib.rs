//! agentlint: catches the production-readiness problems AI coding agents
//! tend to leave behind.
//!
//! The library exposes the rule set and engines behind the `agentlint`
//! binary so they can be embedded or tested directly. See [`lint`] for the
//! pipeline and [`output`] for the report formats.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod lint;
pub mod output;

#[doc(hidden)]
pub mod test_utils;

pub use error::{AgentlintError, Result};
