//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod commands;
pub mod output;

/// Skill Console - browse and edit skills stored on a skill service
#[derive(Parser, Debug)]
#[command(name = "skc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path (default: ~/.config/skc/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Service base URL, overriding config and environment
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List skills known to the service
    List(commands::list::ListArgs),

    /// Show the file tree of a skill
    Tree(commands::tree::TreeArgs),

    /// Print a file of a skill
    Cat(commands::cat::CatArgs),

    /// Replace the content of an existing file
    Put(commands::put::PutArgs),

    /// Create a file
    Touch(commands::touch::TouchArgs),

    /// Create a directory
    Mkdir(commands::mkdir::MkdirArgs),

    /// Delete a file or directory (requires --yes)
    Rm(commands::rm::RmArgs),

    /// Delete a whole skill (requires --yes)
    Delete(commands::delete::DeleteArgs),

    /// Import a skill from a .zip archive
    Import(commands::import::ImportArgs),

    /// Download a skill as a .zip archive
    Export(commands::export::ExportArgs),

    /// Show or edit skill dependencies
    Deps(commands::deps::DepsArgs),

    /// Interactive three-pane console
    Browse(commands::browse::BrowseArgs),
}
