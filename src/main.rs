//! skc - Skill Console CLI
//!
//! Browse and edit skills stored on a skill service.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use skill_console::Result;
use skill_console::app::AppContext;
use skill_console::cli::output::{emit_human_error, emit_json, robot_error_structured};
use skill_console::cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(&cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                // JSON mode: structured error on stdout
                if emit_json(&robot_error_structured(&e)).is_err() {
                    eprintln!("Error: {e}");
                }
            } else {
                emit_human_error(&e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let ctx = AppContext::from_cli(cli)?;
    skill_console::cli::commands::run(&ctx, &cli.command).await
}

fn init_tracing(cli: &Cli) {
    // The TUI owns the terminal; log lines would tear the screen.
    if cli.quiet || matches!(cli.command, Commands::Browse(_)) {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,skill_console=info",
        1 => "info,skill_console=debug",
        2 => "debug,skill_console=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
