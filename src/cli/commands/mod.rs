//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - `run()` function to execute the command

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::Result;

pub mod browse;
pub mod cat;
pub mod delete;
pub mod deps;
pub mod export;
pub mod import;
pub mod list;
pub mod mkdir;
pub mod put;
pub mod rm;
pub mod touch;
pub mod tree;

/// Dispatch a command to its handler
pub async fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::List(args) => list::run(ctx, args).await,
        Commands::Tree(args) => tree::run(ctx, args).await,
        Commands::Cat(args) => cat::run(ctx, args).await,
        Commands::Put(args) => put::run(ctx, args).await,
        Commands::Touch(args) => touch::run(ctx, args).await,
        Commands::Mkdir(args) => mkdir::run(ctx, args).await,
        Commands::Rm(args) => rm::run(ctx, args).await,
        Commands::Delete(args) => delete::run(ctx, args).await,
        Commands::Import(args) => import::run(ctx, args).await,
        Commands::Export(args) => export::run(ctx, args).await,
        Commands::Deps(args) => deps::run(ctx, args).await,
        Commands::Browse(args) => browse::run(ctx, args).await,
    }
}

/// Select `slug` so file operations have an active skill.
pub(crate) async fn open_skill(ctx: &AppContext, slug: &str) -> Result<()> {
    ctx.console.select_skill_by_slug(slug).await
}
