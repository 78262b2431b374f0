//! Property test suite entry point.

mod diff_properties;
mod edit_properties;
