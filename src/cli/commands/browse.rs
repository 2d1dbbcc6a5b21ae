//! skc browse - Interactive three-pane console

use clap::Args;

use crate::app::AppContext;
use crate::error::{ConsoleError, Result};
use crate::tui::run_browse_tui;

#[derive(Args, Debug)]
pub struct BrowseArgs {
    /// Select this skill on start
    #[arg(long)]
    pub skill: Option<String>,
}

pub async fn run(ctx: &AppContext, args: &BrowseArgs) -> Result<()> {
    if ctx.json() {
        return Err(ConsoleError::ValidationFailed(
            "browse is interactive and has no JSON output".to_string(),
        ));
    }
    if let Some(slug) = &args.skill {
        ctx.console.select_skill_by_slug(slug).await?;
    }
    run_browse_tui(&ctx.console).await
}
