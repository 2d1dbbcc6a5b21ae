//! skc export - Download a skill as a .zip archive

use std::path::PathBuf;

use clap::Args;

use crate::app::AppContext;
use crate::error::Result;
use crate::transfer::FileDownloadSink;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Skill slug
    pub slug: String,

    /// Directory to write the archive into
    #[arg(long, short, default_value = ".")]
    pub out: PathBuf,
}

pub async fn run(ctx: &AppContext, args: &ExportArgs) -> Result<()> {
    tokio::fs::create_dir_all(&args.out).await?;
    let sink = FileDownloadSink::new(args.out.clone());
    let exported = ctx.console.export_skill(args.slug.trim(), &sink).await?;
    ctx.emit(exported, |_| {})
}
