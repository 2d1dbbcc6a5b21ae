//! skc mkdir - Create a directory in a skill

use clap::Args;

use crate::app::AppContext;
use crate::cli::commands::open_skill;
use crate::cli::commands::touch::CreatedOutput;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct MkdirArgs {
    /// Skill slug
    pub slug: String,

    /// Path of the new directory
    pub path: String,
}

pub async fn run(ctx: &AppContext, args: &MkdirArgs) -> Result<()> {
    open_skill(ctx, &args.slug).await?;
    let path = ctx.console.create_node(&args.path, true, None).await?;

    let output = CreatedOutput {
        slug: args.slug.clone(),
        path,
        is_dir: true,
    };
    ctx.emit(output, |_| {})
}
