//! skc tree - Show the file tree of a skill

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::commands::open_skill;
use crate::error::Result;
use crate::tree::{self, ExpansionState, TreeNode, VisibleRow};

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Skill slug
    pub slug: String,
}

#[derive(Serialize)]
struct TreeOutput {
    slug: String,
    tree: Vec<TreeNode>,
}

pub async fn run(ctx: &AppContext, args: &TreeArgs) -> Result<()> {
    open_skill(ctx, &args.slug).await?;
    let nodes = ctx.console.read(|s| s.tree.clone());

    let output = TreeOutput {
        slug: args.slug.clone(),
        tree: nodes,
    };
    ctx.emit(output, |out| {
        println!("{}", out.slug.bold());
        for line in render_rows(&out.tree) {
            println!("{line}");
        }
    })
}

/// Fully expanded rows, indented two spaces per level.
fn render_rows(nodes: &[TreeNode]) -> Vec<String> {
    let mut expansion = ExpansionState::new();
    expansion.expand_all(nodes);
    tree::visible_rows(nodes, &expansion)
        .iter()
        .map(render_row)
        .collect()
}

fn render_row(row: &VisibleRow) -> String {
    let indent = "  ".repeat(row.depth + 1);
    if row.is_dir {
        format!("{indent}{}", format!("{}/", row.name).blue().bold())
    } else {
        format!("{indent}{}", row.name)
    }
}
