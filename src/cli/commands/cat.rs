//! skc cat - Print a file of a skill

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::commands::open_skill;
use crate::error::{ConsoleError, Result};

#[derive(Args, Debug)]
pub struct CatArgs {
    /// Skill slug
    pub slug: String,

    /// File path inside the skill
    pub path: String,
}

#[derive(Serialize)]
struct CatOutput {
    slug: String,
    path: String,
    content: String,
}

pub async fn run(ctx: &AppContext, args: &CatArgs) -> Result<()> {
    let content = open_file(ctx, &args.slug, &args.path).await?;
    let output = CatOutput {
        slug: args.slug.clone(),
        path: args.path.trim().to_string(),
        content,
    };
    ctx.emit(output, |out| {
        if out.content.ends_with('\n') {
            print!("{}", out.content);
        } else {
            println!("{}", out.content);
        }
    })
}

/// Open `path` of `slug` and return its loaded content.
pub(crate) async fn open_file(ctx: &AppContext, slug: &str, path: &str) -> Result<String> {
    open_skill(ctx, slug).await?;
    let path = path.trim();
    ctx.console.open_path(path).await?;
    ctx.console.read(|s| {
        if s.editing.has_file() {
            Ok(s.editing.saved().to_string())
        } else {
            Err(ConsoleError::ValidationFailed(format!("{path} is a directory")))
        }
    })
}
