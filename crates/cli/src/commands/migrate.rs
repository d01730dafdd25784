use crate::commands::CommandResult;
use basket_core::config::{AppConfig, LoadOptions};
use basket_db::{connect, migrations};

const COMMAND: &str = "migrate";

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    match runtime.block_on(apply(&config)) {
        Ok(message) => CommandResult::success(COMMAND, message),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure(COMMAND, error_class, message, exit_code)
        }
    }
}

async fn apply(config: &AppConfig) -> Result<String, (&'static str, String, u8)> {
    let pool = connect(&config.database)
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

    let outcome = migrations::run_pending(&pool).await;

    let message = match outcome {
        Ok(()) => {
            // Best-effort count for the success message; the migration
            // itself has already committed.
            let applied: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM _sqlx_migrations")
                .fetch_one(&pool)
                .await
                .unwrap_or(0);
            Ok(format!(
                "schema is current for `{}` ({applied} migrations applied)",
                config.database.url
            ))
        }
        Err(error) => Err(("migration", error.to_string(), 5u8)),
    };

    pool.close().await;
    message
}
