//! Terminal user interface for skill-console.
//!
//! This module provides the interactive `skc browse` console using ratatui.

pub mod browse;
pub mod editor;

pub use browse::{Action, BrowseTui, FocusPanel, run_browse_tui};
