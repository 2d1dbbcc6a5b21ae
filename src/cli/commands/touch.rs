//! skc touch - Create a file in a skill

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::commands::open_skill;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct TouchArgs {
    /// Skill slug
    pub slug: String,

    /// Path of the new file
    pub path: String,

    /// Initial content (empty by default)
    #[arg(long)]
    pub content: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct CreatedOutput {
    pub slug: String,
    pub path: String,
    pub is_dir: bool,
}

pub async fn run(ctx: &AppContext, args: &TouchArgs) -> Result<()> {
    open_skill(ctx, &args.slug).await?;
    let path = ctx
        .console
        .create_node(&args.path, false, args.content.clone())
        .await?;

    let output = CreatedOutput {
        slug: args.slug.clone(),
        path,
        is_dir: false,
    };
    ctx.emit(output, |_| {})
}
