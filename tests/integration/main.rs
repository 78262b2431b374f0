//! Integration test suite entry point.

mod diff_mapping;
mod fix_engine;
mod lint_engine;
mod support;
