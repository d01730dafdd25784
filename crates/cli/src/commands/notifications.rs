use std::sync::Arc;

use basket_core::config::{AppConfig, LoadOptions};
use basket_core::domain::notification::NotificationId;
use basket_db::connect;
use basket_db::repositories::{SqlNotificationRepository, SqlUserRepository};
use basket_services::{NotificationService, ServiceError};

use crate::commands::cart::{render_json, resolve_email};
use crate::commands::{init_logging, service_failure, CommandResult};
use crate::NotificationAction;

const COMMAND: &str = "notifications";

pub fn run(action: NotificationAction) -> CommandResult {
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
    init_logging(&config);

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

    runtime.block_on(async {
        let pool = match connect(&config.database).await {
            Ok(pool) => pool,
            Err(error) => {
                return CommandResult::failure(
                    COMMAND,
                    "db_connectivity",
                    error.to_string(),
                    4,
                );
            }
        };

        let users = Arc::new(SqlUserRepository::new(pool.clone()));
        let service = NotificationService::new(
            users.clone(),
            Arc::new(SqlNotificationRepository::new(pool.clone())),
        );

        let result = execute(&service, users.as_ref(), action).await;
        pool.close().await;

        match result {
            Ok(message) => CommandResult::success(COMMAND, message),
            Err(error) => service_failure(COMMAND, error),
        }
    })
}

async fn execute(
    service: &NotificationService,
    users: &SqlUserRepository,
    action: NotificationAction,
) -> Result<String, ServiceError> {
    match action {
        NotificationAction::List { email } => {
            let user_id = resolve_email(users, &email).await?;
            let feed = service.notifications_for(user_id).await?;
            Ok(render_json(&feed))
        }
        NotificationAction::UnreadCount { email } => {
            let user_id = resolve_email(users, &email).await?;
            let count = service.unread_count(user_id).await?;
            Ok(format!("{count}"))
        }
        NotificationAction::MarkRead { email, id } => {
            let user_id = resolve_email(users, &email).await?;
            service.mark_read(user_id, NotificationId(id)).await?;
            Ok(format!("marked notification {id} read"))
        }
        NotificationAction::MarkAllRead { email } => {
            let user_id = resolve_email(users, &email).await?;
            let marked = service.mark_all_read(user_id).await?;
            Ok(format!("marked {marked} notifications read"))
        }
    }
}
