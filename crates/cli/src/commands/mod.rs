pub mod cart;
pub mod config;
pub mod doctor;
pub mod migrate;
pub mod notifications;
pub mod seed;

use serde::Serialize;

use basket_core::config::AppConfig;
use basket_services::{ErrorKind, ServiceError};

/// Install the tracing subscriber from config. Repeated calls are
/// harmless; only the first install wins.
pub(crate) fn init_logging(config: &AppConfig) {
    use basket_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    let _ = match config.logging.format {
        Compact => tracing_subscriber::fmt()
            .with_target(false)
            .with_max_level(log_level)
            .compact()
            .try_init(),
        Pretty => tracing_subscriber::fmt()
            .with_target(false)
            .with_max_level(log_level)
            .pretty()
            .try_init(),
        Json => tracing_subscriber::fmt()
            .with_target(false)
            .with_max_level(log_level)
            .json()
            .try_init(),
    };
}

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
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Map a service failure onto the command envelope. Exit codes stay
/// stable per error class so scripts can branch on them.
pub(crate) fn service_failure(command: &str, error: ServiceError) -> CommandResult {
    let kind = error.kind();
    let exit_code = match kind {
        ErrorKind::NotFound => 6,
        ErrorKind::Unprocessable => 7,
        ErrorKind::Forbidden => 8,
        ErrorKind::Internal => 9,
    };
    CommandResult::failure(command, kind.as_str(), error.to_string(), exit_code)
}

#[cfg(test)]
mod tests {
    use basket_services::ServiceError;

    use super::{service_failure, CommandResult};

    #[test]
    fn success_envelope_is_json_with_ok_status() {
        let result = CommandResult::success("migrate", "applied pending migrations");
        assert_eq!(result.exit_code, 0);
        assert!(result.output.contains("\"status\":\"ok\""));
        assert!(result.output.contains("\"command\":\"migrate\""));
    }

    #[test]
    fn failure_envelope_carries_error_class_and_exit_code() {
        let result = CommandResult::failure("seed", "seed_verification", "missing rows", 6);
        assert_eq!(result.exit_code, 6);
        assert!(result.output.contains("\"error_class\":\"seed_verification\""));
    }

    #[test]
    fn service_errors_map_to_stable_exit_codes() {
        let not_found = service_failure("cart", ServiceError::NotFound { resource: "user" });
        assert_eq!(not_found.exit_code, 6);
        assert!(not_found.output.contains("\"error_class\":\"not_found\""));

        let unprocessable = service_failure(
            "cart",
            ServiceError::InsufficientStock { requested: 5, available: 2 },
        );
        assert_eq!(unprocessable.exit_code, 7);

        let forbidden =
            service_failure("cart", ServiceError::Forbidden { resource: "cart item", id: 7 });
        assert_eq!(forbidden.exit_code, 8);
    }
}
