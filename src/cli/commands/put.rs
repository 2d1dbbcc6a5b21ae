//! skc put - Replace the content of an existing file

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::commands::cat::open_file;
use crate::error::Result;

#[derive(Args, Debug)]
#[command(group(clap::ArgGroup::new("source").required(true).args(["file", "content"])))]
pub struct PutArgs {
    /// Skill slug
    pub slug: String,

    /// File path inside the skill
    pub path: String,

    /// Read the new content from a local file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// New content given inline
    #[arg(long)]
    pub content: Option<String>,
}

#[derive(Serialize)]
struct PutOutput {
    slug: String,
    path: String,
    changed: bool,
    bytes: usize,
}

pub async fn run(ctx: &AppContext, args: &PutArgs) -> Result<()> {
    let content = match (&args.file, &args.content) {
        (Some(file), _) => tokio::fs::read_to_string(file).await?,
        (None, Some(content)) => content.clone(),
        (None, None) => String::new(),
    };

    open_file(ctx, &args.slug, &args.path).await?;
    ctx.console.update_draft(&content);

    let changed = ctx.console.read(|s| s.is_dirty());
    if changed {
        ctx.console.commit_save().await?;
    }

    let output = PutOutput {
        slug: args.slug.clone(),
        path: args.path.trim().to_string(),
        changed,
        bytes: content.len(),
    };
    ctx.emit(output, |out| {
        if !out.changed {
            println!("{} is unchanged", out.path);
        }
    })
}
