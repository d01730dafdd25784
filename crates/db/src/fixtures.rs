use sqlx::Executor;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// Canonical demo seeds and verification contract for the cart and
/// notification flows.
const SEED_USERS: &[SeedUserContract] = &[
    SeedUserContract {
        user_id: 101,
        email: "amy@example.com",
        expected_cart_lines: 2,
        expected_unread: 1,
        description: "Two cart lines, one read and one unread notification",
    },
    SeedUserContract {
        user_id: 102,
        email: "ben@example.com",
        expected_cart_lines: 1,
        expected_unread: 1,
        description: "One cart line, one unread coupon notification",
    },
    SeedUserContract {
        user_id: 103,
        email: "cho@example.com",
        expected_cart_lines: 0,
        expected_unread: 0,
        description: "Empty cart, empty notification feed",
    },
];

const SEED_PRODUCT_IDS: &[i64] = &[501, 502, 503, 504, 505, 506];

const SEED_PRODUCT_STATUSES: &[(&str, i64)] = &[("ACTIVE", 4), ("INACTIVE", 1), ("SOLD_OUT", 1)];

/// Demo seed dataset for local runs and end-to-end checks.
///
/// Provides deterministic fixtures covering:
/// 1. A user mid-shopping with a populated cart
/// 2. Products in every listing state, including one near sell-out
/// 3. A mixed read/unread notification feed
pub struct DemoSeedDataset;

impl DemoSeedDataset {
    /// SQL fixture content for the demo seed data.
    pub const SQL: &str = include_str!("../../../config/fixtures/demo_seed_data.sql");

    /// Load the demo seed dataset into the database.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;

        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        let users_seeded = SEED_USERS
            .iter()
            .map(|user| UserSeedInfo {
                user_id: user.user_id,
                email: user.email,
                description: user.description,
            })
            .collect::<Vec<_>>();

        Ok(SeedResult { users_seeded })
    }

    /// Verify that seed data exists and matches the contract.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        let product_ids =
            SEED_PRODUCT_IDS.iter().map(i64::to_string).collect::<Vec<_>>().join(", ");
        let product_count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(1) FROM products WHERE id IN ({product_ids})"
        ))
        .fetch_one(pool)
        .await?;
        checks.push(("products", product_count == SEED_PRODUCT_IDS.len() as i64));

        for (status, expected) in SEED_PRODUCT_STATUSES {
            let count: i64 = sqlx::query_scalar(&format!(
                "SELECT COUNT(1) FROM products WHERE id IN ({product_ids}) AND status = ?1"
            ))
            .bind(status)
            .fetch_one(pool)
            .await?;
            checks.push((*status, count == *expected));
        }

        for user in SEED_USERS {
            let user_exists: i64 = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1 AND email = ?2)",
            )
            .bind(user.user_id)
            .bind(user.email)
            .fetch_one(pool)
            .await?;
            checks.push((user.email, user_exists == 1));

            let cart_lines: i64 =
                sqlx::query_scalar("SELECT COUNT(1) FROM cart_items WHERE user_id = ?1")
                    .bind(user.user_id)
                    .fetch_one(pool)
                    .await?;
            checks.push((user.cart_label(), cart_lines == user.expected_cart_lines));

            let unread: i64 = sqlx::query_scalar(
                "SELECT COUNT(1) FROM notifications WHERE user_id = ?1 AND is_read = 0",
            )
            .bind(user.user_id)
            .fetch_one(pool)
            .await?;
            checks.push((user.unread_label(), unread == user.expected_unread));
        }

        let all_present = checks.iter().all(|(_, exists)| *exists);
        Ok(VerificationResult { all_present, checks })
    }
}

struct SeedUserContract {
    user_id: i64,
    email: &'static str,
    expected_cart_lines: i64,
    expected_unread: i64,
    description: &'static str,
}

impl SeedUserContract {
    fn cart_label(&self) -> &'static str {
        match self.user_id {
            101 => "amy-cart-lines",
            102 => "ben-cart-lines",
            _ => "cho-cart-lines",
        }
    }

    fn unread_label(&self) -> &'static str {
        match self.user_id {
            101 => "amy-unread",
            102 => "ben-unread",
            _ => "cho-unread",
        }
    }
}

#[derive(Debug)]
pub struct SeedResult {
    pub users_seeded: Vec<UserSeedInfo>,
}

#[derive(Debug)]
pub struct UserSeedInfo {
    pub user_id: i64,
    pub email: &'static str,
    pub description: &'static str,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

#[cfg(test)]
mod tests {
    use super::DemoSeedDataset;
    use crate::connect_in_memory;
    use crate::migrations::run_pending;

    #[tokio::test]
    async fn load_then_verify_passes_every_check() {
        let pool = connect_in_memory().await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        let seeded = DemoSeedDataset::load(&pool).await.expect("load seeds");
        assert_eq!(seeded.users_seeded.len(), 3);

        let verified = DemoSeedDataset::verify(&pool).await.expect("verify seeds");
        assert!(
            verified.all_present,
            "failed checks: {:?}",
            verified
                .checks
                .iter()
                .filter(|(_, passed)| !passed)
                .map(|(label, _)| *label)
                .collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn load_is_re_runnable() {
        let pool = connect_in_memory().await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        DemoSeedDataset::load(&pool).await.expect("first load");
        DemoSeedDataset::load(&pool).await.expect("second load");

        let verified = DemoSeedDataset::verify(&pool).await.expect("verify seeds");
        assert!(verified.all_present);
    }

    #[tokio::test]
    async fn verify_reports_missing_rows() {
        let pool = connect_in_memory().await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        DemoSeedDataset::load(&pool).await.expect("load seeds");
        sqlx::query("DELETE FROM cart_items WHERE user_id = 101")
            .execute(&pool)
            .await
            .expect("drop amy's cart");

        let verified = DemoSeedDataset::verify(&pool).await.expect("verify seeds");
        assert!(!verified.all_present);
        let amy_cart =
            verified.checks.iter().find(|(label, _)| *label == "amy-cart-lines").expect("check");
        assert!(!amy_cart.1);
    }
}
