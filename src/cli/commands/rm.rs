//! skc rm - Delete a file or directory of a skill

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::commands::open_skill;
use crate::console::check_deletable;
use crate::error::{ConsoleError, Result};

#[derive(Args, Debug)]
pub struct RmArgs {
    /// Skill slug
    pub slug: String,

    /// File or directory path inside the skill
    pub path: String,

    /// Confirm the delete
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Serialize)]
struct RmOutput {
    slug: String,
    path: String,
    deleted: bool,
}

pub async fn run(ctx: &AppContext, args: &RmArgs) -> Result<()> {
    // Refusals never reach the service.
    let path = check_deletable(&args.path)?;
    if !args.yes {
        return Err(ConsoleError::ConfirmationRequired(format!(
            "deleting '{path}' from '{}' cannot be undone; re-run with --yes",
            args.slug
        )));
    }

    open_skill(ctx, &args.slug).await?;
    let intent = ctx.console.prepare_delete_node(&path)?;
    ctx.console.delete(intent.confirm()).await?;

    let output = RmOutput {
        slug: args.slug.clone(),
        path,
        deleted: true,
    };
    ctx.emit(output, |_| {})
}
