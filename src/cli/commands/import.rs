//! skc import - Import a skill from a .zip archive

use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::app::AppContext;
use crate::error::Result;
use crate::tree::{self, ExpansionState};

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Path to the .zip archive
    pub archive: PathBuf,
}

#[derive(Serialize)]
struct ImportOutput {
    slug: String,
    files: usize,
}

pub async fn run(ctx: &AppContext, args: &ImportArgs) -> Result<()> {
    let result = ctx.console.import_file(&args.archive).await?;

    let files = ctx.console.read(|s| {
        if s.active_slug() == Some(result.slug.as_str()) {
            let mut expansion = ExpansionState::new();
            expansion.expand_all(&s.tree);
            tree::visible_rows(&s.tree, &expansion)
                .iter()
                .filter(|row| !row.is_dir)
                .count()
        } else {
            0
        }
    });

    let output = ImportOutput {
        slug: result.slug,
        files,
    };
    ctx.emit(output, |out| {
        println!("{} {}", "Imported as".dimmed(), out.slug.cyan().bold());
    })
}
