pub mod config;
pub mod doctor;
pub mod plan;
pub mod recommend;
pub mod tables;

use serde::Serialize;
use showprice_core::{
    config::{AppConfig, LoadOptions},
    ApplicationError, DemandDataset, ReferenceTables,
};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        tracing::error!(
            event_name = "cli.command.failed",
            command,
            error_class = error.error_class(),
            error = %error,
            "command failed"
        );
        Self::failure(
            command,
            error.error_class(),
            format!("{} ({error})", error.user_message()),
            error.exit_code(),
        )
    }

    /// Raw output for commands whose payload is not the status envelope.
    pub fn raw(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }
}

/// Everything a forecast needs, loaded once per invocation.
pub struct ForecastContext {
    pub config: AppConfig,
    pub tables: ReferenceTables,
    pub dataset: DemandDataset,
}

impl ForecastContext {
    pub fn load(options: &LoadOptions) -> Result<Self, ApplicationError> {
        let config = AppConfig::load(options.clone())?;
        let tables = ReferenceTables::load_or_default(config.reference.path.as_deref())?;
        let dataset = DemandDataset::load(&config.dataset.path)?;
        Ok(Self { config, tables, dataset })
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

fn to_json<T: Serialize>(command: &str, value: &T) -> CommandResult {
    match serde_json::to_string_pretty(value) {
        Ok(output) => CommandResult::raw(output),
        Err(error) => CommandResult::failure(command, "serialization", error.to_string(), 7),
    }
}
