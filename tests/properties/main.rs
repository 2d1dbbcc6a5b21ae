//! Property-based tests for tree conversion and path handling.

mod path_tests;
mod tree_tests;
