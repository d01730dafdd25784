use std::sync::Arc;

use basket_core::config::{AppConfig, LoadOptions};
use basket_core::domain::cart::CartItemId;
use basket_core::domain::product::ProductId;
use basket_core::domain::user::UserId;
use basket_db::connect;
use basket_db::repositories::{
    SqlCartItemRepository, SqlProductRepository, SqlUserRepository, UserRepository,
};
use basket_services::{CartService, ServiceError};

use crate::commands::{init_logging, service_failure, CommandResult};
use crate::CartAction;

const COMMAND: &str = "cart";

pub fn run(action: CartAction) -> CommandResult {
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
        let service = CartService::new(
            users.clone(),
            Arc::new(SqlProductRepository::new(pool.clone())),
            Arc::new(SqlCartItemRepository::new(pool.clone())),
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
    service: &CartService,
    users: &SqlUserRepository,
    action: CartAction,
) -> Result<String, ServiceError> {
    match action {
        CartAction::Add { email, product, quantity } => {
            let user_id = resolve_email(users, &email).await?;
            let view = service.add_to_cart(user_id, ProductId(product), quantity).await?;
            Ok(render_json(&view))
        }
        CartAction::List { email } => {
            let user_id = resolve_email(users, &email).await?;
            let cart = service.my_cart(user_id).await?;
            Ok(render_json(&cart))
        }
        CartAction::Update { email, item, quantity } => {
            let user_id = resolve_email(users, &email).await?;
            let view = service.update_cart_item(user_id, CartItemId(item), quantity).await?;
            Ok(render_json(&view))
        }
        CartAction::Remove { email, item } => {
            let user_id = resolve_email(users, &email).await?;
            service.remove_cart_item(user_id, CartItemId(item)).await?;
            Ok(format!("removed cart item {item}"))
        }
        CartAction::Clear { email } => {
            let user_id = resolve_email(users, &email).await?;
            let removed = service.clear_cart(user_id).await?;
            Ok(format!("cleared cart ({removed} lines removed)"))
        }
        CartAction::Count { email } => {
            let user_id = resolve_email(users, &email).await?;
            let count = service.cart_count(user_id).await?;
            Ok(format!("{count}"))
        }
    }
}

pub(crate) async fn resolve_email(
    users: &SqlUserRepository,
    email: &str,
) -> Result<UserId, ServiceError> {
    users
        .find_by_email(email)
        .await
        .map_err(ServiceError::from)?
        .map(|user| user.id)
        .ok_or(ServiceError::NotFound { resource: "user" })
}

pub(crate) fn render_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|error| format!("serialization failed: {error}"))
}
