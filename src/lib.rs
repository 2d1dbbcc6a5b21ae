pub mod app;
pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod manifest;
pub mod service;
pub mod session;
pub mod test_utils;
pub mod transfer;
pub mod tree;
pub mod tui;

pub use error::{ConsoleError, Result};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
