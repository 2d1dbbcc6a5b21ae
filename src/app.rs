//! Shared state handed to every command.

use std::sync::Arc;

use tracing::debug;

use crate::cli::Cli;
use crate::cli::output::{self, robot_ok};
use crate::config::{Config, OutputFormat};
use crate::console::{Console, ConsoleOptions};
use crate::error::Result;
use crate::service::{HttpSkillService, SkillService};

pub struct AppContext {
    pub config: Config,
    pub console: Console,
    pub format: OutputFormat,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = Config::load(cli.config.as_deref())?;
        if let Some(base_url) = &cli.base_url {
            config.service.base_url.clone_from(base_url);
            config.validate()?;
        }
        let format = if cli.json {
            OutputFormat::Json
        } else {
            config.output.format
        };
        debug!(base_url = %config.service.base_url, ?format, "context ready");

        let service = HttpSkillService::from_config(&config.service)?;
        Ok(Self::with_service(config, Arc::new(service), format))
    }

    /// Context over an arbitrary service, used by tests.
    #[must_use]
    pub fn with_service(config: Config, service: Arc<dyn SkillService>, format: OutputFormat) -> Self {
        let console = Console::new(service, ConsoleOptions::from(&config.console));
        Self {
            config,
            console,
            format,
        }
    }

    #[must_use]
    pub fn json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Print `data` as a JSON envelope, or run `human` and flush notices.
    pub fn emit<T: serde::Serialize>(&self, data: T, human: impl FnOnce(&T)) -> Result<()> {
        let notices = self.console.drain_notices();
        if self.json() {
            output::emit_json(&robot_ok(data).with_notices(&notices))
        } else {
            human(&data);
            output::emit_notices(&notices);
            Ok(())
        }
    }
}
