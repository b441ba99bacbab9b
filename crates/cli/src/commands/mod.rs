pub mod chat;
pub mod config;
pub mod doctor;
pub mod query;

use gamewise_core::config::ConfigError;
use gamewise_core::ApplicationError;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Default, Serialize)]
pub struct CommandOutcome {
    pub command: String,
    pub status: String,
    pub error_class: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl CommandResult {
    /// Nothing left to print: the command already talked to the user on stdout.
    pub fn quiet() -> Self {
        Self { exit_code: 0, output: String::new() }
    }

    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::outcome(
            0,
            CommandOutcome {
                command: command.to_string(),
                status: "ok".to_string(),
                message: message.into(),
                ..CommandOutcome::default()
            },
        )
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        Self::outcome(
            exit_code,
            CommandOutcome {
                command: command.to_string(),
                status: "error".to_string(),
                error_class: Some(error_class.to_string()),
                message: message.into(),
                ..CommandOutcome::default()
            },
        )
    }

    pub fn config_failure(command: &str, error: &ConfigError) -> Self {
        Self::failure(command, "config_validation", error.to_string(), 2)
    }

    /// Maps an error surfaced through the agent seam onto the CLI error contract.
    pub fn from_error(command: &str, error: &anyhow::Error) -> Self {
        if let Some(application) = error.downcast_ref::<ApplicationError>() {
            return Self::failure(
                command,
                application.error_class(),
                format!("{error:#}"),
                application.exit_code(),
            );
        }
        if error.downcast_ref::<ConfigError>().is_some() {
            return Self::failure(command, "config_validation", format!("{error:#}"), 2);
        }
        Self::failure(command, "integration", format!("{error:#}"), 6)
    }

    pub fn outcome(exit_code: u8, payload: CommandOutcome) -> Self {
        Self { exit_code, output: serialize_payload(payload) }
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

pub(crate) fn current_thread_runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread().enable_all().build()
}
