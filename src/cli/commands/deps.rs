//! skc deps - Show or edit skill dependencies

use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::commands::open_skill;
use crate::cli::output::{HumanLayout, emit_human};
use crate::error::Result;
use crate::service::DependencyOptions;
use crate::session::{DependencyDraft, DependencyKind};

#[derive(Args, Debug)]
pub struct DepsArgs {
    #[command(subcommand)]
    pub command: DepsCommand,
}

#[derive(Subcommand, Debug)]
pub enum DepsCommand {
    /// Show the dependencies of a skill and the selectable options
    Show(DepsShowArgs),
    /// Replace dependency lists of a skill
    Set(DepsSetArgs),
}

#[derive(Args, Debug)]
pub struct DepsShowArgs {
    /// Skill slug
    pub slug: String,
}

#[derive(Args, Debug)]
pub struct DepsSetArgs {
    /// Skill slug
    pub slug: String,

    /// Tool dependency (repeatable); replaces the tool list
    #[arg(long)]
    pub tool: Vec<String>,

    /// MCP dependency (repeatable); replaces the MCP list
    #[arg(long)]
    pub mcp: Vec<String>,

    /// Skill dependency (repeatable); replaces the skill list
    #[arg(long)]
    pub skill: Vec<String>,

    /// Empty a list: tools, mcps or skills (repeatable)
    #[arg(long, value_name = "KIND")]
    pub clear: Vec<DependencyKind>,
}

#[derive(Serialize)]
struct DepsOutput {
    slug: String,
    dependencies: DependencyDraft,
    options: DependencyOptions,
    changed: bool,
}

pub async fn run(ctx: &AppContext, args: &DepsArgs) -> Result<()> {
    match &args.command {
        DepsCommand::Show(show) => run_show(ctx, show).await,
        DepsCommand::Set(set) => run_set(ctx, set).await,
    }
}

async fn load(ctx: &AppContext, slug: &str) -> Result<()> {
    let (selected, options) = tokio::join!(
        open_skill(ctx, slug),
        ctx.console.load_dependency_options()
    );
    selected.and(options)
}

async fn run_show(ctx: &AppContext, args: &DepsShowArgs) -> Result<()> {
    load(ctx, &args.slug).await?;
    let output = snapshot(ctx, &args.slug, false);
    ctx.emit(output, render)
}

async fn run_set(ctx: &AppContext, args: &DepsSetArgs) -> Result<()> {
    load(ctx, &args.slug).await?;

    for (kind, values) in [
        (DependencyKind::Tool, &args.tool),
        (DependencyKind::Mcp, &args.mcp),
        (DependencyKind::Skill, &args.skill),
    ] {
        if args.clear.contains(&kind) {
            ctx.console.set_dependencies(kind, &[]);
        } else if !values.is_empty() {
            ctx.console.set_dependencies(kind, values);
        }
    }

    let changed = ctx.console.read(|s| s.can_save_dependencies());
    if changed {
        ctx.console.save_dependencies().await?;
    }

    let output = snapshot(ctx, &args.slug, changed);
    ctx.emit(output, |out| {
        if !out.changed {
            println!("{}", "Dependencies unchanged".dimmed());
        }
        render(out);
    })
}

fn snapshot(ctx: &AppContext, slug: &str, changed: bool) -> DepsOutput {
    ctx.console.read(|s| DepsOutput {
        slug: slug.to_string(),
        dependencies: s.dependencies.clone(),
        options: DependencyOptions {
            tools: s.dependency_options.tools.clone(),
            mcps: s.dependency_options.mcps.clone(),
            skills: s.skill_dependency_options(),
        },
        changed,
    })
}

fn render(out: &DepsOutput) {
    let mut layout = HumanLayout::new();
    layout.title(&out.slug);
    for kind in DependencyKind::ALL {
        layout.section(kind.label());
        let chosen = out.dependencies.list(kind);
        if chosen.is_empty() {
            layout.bullet(&"(none)".dimmed().to_string());
        }
        for value in chosen {
            layout.bullet(value);
        }
        let available = match kind {
            DependencyKind::Tool => &out.options.tools,
            DependencyKind::Mcp => &out.options.mcps,
            DependencyKind::Skill => &out.options.skills,
        };
        let rest: Vec<&str> = available
            .iter()
            .filter(|option| !chosen.contains(option))
            .map(String::as_str)
            .collect();
        if !rest.is_empty() {
            layout.kv("available", &rest.join(", "));
        }
        layout.blank();
    }
    emit_human(layout);
}
