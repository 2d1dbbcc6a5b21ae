//! skc list - List skills known to the service

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::app::AppContext;
use crate::error::Result;
use crate::service::Skill;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Keep skills whose slug, name or description contains this text
    #[arg(long, short)]
    pub filter: Option<String>,
}

#[derive(Serialize)]
struct ListOutput {
    count: usize,
    skills: Vec<Skill>,
}

pub async fn run(ctx: &AppContext, args: &ListArgs) -> Result<()> {
    ctx.console.refresh_skills().await?;

    let skills: Vec<Skill> = ctx.console.read(|s| {
        s.filtered_skills(args.filter.as_deref().unwrap_or_default())
            .into_iter()
            .cloned()
            .collect()
    });

    let output = ListOutput {
        count: skills.len(),
        skills,
    };
    ctx.emit(output, |out| list_human(&out.skills))
}

fn list_human(skills: &[Skill]) {
    if skills.is_empty() {
        println!("{}", "No skills found".dimmed());
        println!();
        println!("Import one with: skc import <archive.zip>");
        return;
    }

    println!(
        "{:32} {:12} {:6} {}",
        "SLUG".bold(),
        "UPDATED".bold(),
        "DEPS".bold(),
        "DESCRIPTION".bold()
    );
    println!("{}", "─".repeat(84).dimmed());

    for skill in skills {
        let slug = if skill.slug.chars().count() > 30 {
            format!("{}…", skill.slug.chars().take(29).collect::<String>())
        } else {
            skill.slug.clone()
        };
        let updated = skill
            .updated_at
            .as_deref()
            .and_then(|at| at.split('T').next())
            .unwrap_or("-");
        let deps = skill.tool_dependencies.len()
            + skill.mcp_dependencies.len()
            + skill.skill_dependencies.len();
        let description = skill.description.lines().next().unwrap_or_default();

        println!(
            "{:32} {:12} {:6} {}",
            slug.cyan(),
            updated,
            deps,
            description.dimmed()
        );
    }

    println!();
    println!("{} {} skills", "Total:".dimmed(), skills.len());
}
