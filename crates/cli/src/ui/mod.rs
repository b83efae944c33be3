//! Terminal output helpers

pub mod diff;

pub use diff::{print_colored_diff, unified_diff};
