//! skc delete - Delete a whole skill

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::error::{ConsoleError, Result};

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Skill slug
    pub slug: String,

    /// Confirm the delete
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Serialize)]
struct DeleteOutput {
    slug: String,
    deleted: bool,
}

pub async fn run(ctx: &AppContext, args: &DeleteArgs) -> Result<()> {
    let intent = ctx.console.prepare_delete_skill(&args.slug)?;
    if !args.yes {
        return Err(ConsoleError::ConfirmationRequired(format!(
            "{} Re-run with --yes",
            intent.description()
        )));
    }

    ctx.console.delete(intent.confirm()).await?;

    let output = DeleteOutput {
        slug: args.slug.trim().to_string(),
        deleted: true,
    };
    ctx.emit(output, |_| {})
}
