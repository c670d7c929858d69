pub mod catalog;
pub mod config;
pub mod doctor;
pub mod message;
pub mod recommend;

use chairfit_core::catalog::Catalog;
use chairfit_core::config::{AppConfig, LoadOptions};
use serde::Serialize;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_CATALOG: u8 = 3;
pub const EXIT_ENGINE: u8 = 4;
pub const EXIT_GATEWAY: u8 = 5;
pub const EXIT_DOCTOR: u8 = 6;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

/// Error envelope printed by every command that fails.
#[derive(Debug, Serialize)]
struct CommandOutcome<'a> {
    command: &'a str,
    status: &'static str,
    error_class: &'a str,
    message: String,
}

impl CommandResult {
    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let outcome =
            CommandOutcome { command, status: "error", error_class, message: message.into() };
        Self { exit_code, output: render_outcome(&outcome) }
    }

    /// Plain-text success output for the human-readable modes.
    pub fn text(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    /// Pretty JSON success output; falls back to the outcome envelope if the
    /// payload cannot be serialized.
    pub fn json<T: Serialize>(command: &str, payload: &T) -> Self {
        match serde_json::to_string_pretty(payload) {
            Ok(output) => Self { exit_code: 0, output },
            Err(error) => Self::failure(command, "serialization", error.to_string(), 1),
        }
    }
}

/// Loads configuration and the catalog it points to, mapping failures onto
/// command outcomes.
pub(crate) fn load_catalog(command: &str) -> Result<(AppConfig, Catalog), CommandResult> {
    let config = AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(command, "config_validation", error.to_string(), EXIT_CONFIG)
    })?;
    let catalog = Catalog::load(config.catalog.path.as_deref()).map_err(|error| {
        CommandResult::failure(command, "catalog", error.to_string(), EXIT_CATALOG)
    })?;
    Ok((config, catalog))
}

fn render_outcome(outcome: &CommandOutcome<'_>) -> String {
    serde_json::to_string(outcome).unwrap_or_else(|_| {
        format!(
            "{{\"command\":\"{}\",\"status\":\"error\",\"error_class\":\"serialization\"}}",
            outcome.command
        )
    })
}
