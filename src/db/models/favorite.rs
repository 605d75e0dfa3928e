//! Saved vehicles per account.

use sqlx::FromRow;

use crate::db::DbPool;

/// Favorites list row, joined with the vehicle it points at.
#[derive(Debug, Clone, FromRow)]
pub struct FavoriteVehicle {
    pub favorite_id: i64,
    pub inv_id: i64,
    pub inv_make: String,
    pub inv_model: String,
    pub inv_year: i64,
    pub inv_price: f64,
    pub inv_thumbnail: String,
}

#[derive(Clone)]
pub struct FavoriteStore {
    pool: DbPool,
}

impl FavoriteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn exists(&self, account_id: i64, inv_id: i64) -> bool {
        sqlx::query_scalar::<_, i64>(
            "SELECT favorite_id FROM favorites WHERE account_id = ? AND inv_id = ?",
        )
        .bind(account_id)
        .bind(inv_id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Favorite lookup failed: {}", e);
            None
        })
        .is_some()
    }

    pub async fn add(&self, account_id: i64, inv_id: i64) -> Result<i64, sqlx::Error> {
        let now = chrono::Utc::now().to_rfc3339();
        let result =
            sqlx::query("INSERT INTO favorites (account_id, inv_id, created_at) VALUES (?, ?, ?)")
                .bind(account_id)
                .bind(inv_id)
                .bind(&now)
                .execute(&self.pool)
                .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn remove(&self, account_id: i64, inv_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM favorites WHERE account_id = ? AND inv_id = ?")
            .bind(account_id)
            .bind(inv_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Most recently saved first. Failures degrade to an empty list.
    pub async fn for_account(&self, account_id: i64) -> Vec<FavoriteVehicle> {
        sqlx::query_as::<_, FavoriteVehicle>(
            r#"
            SELECT f.favorite_id, i.inv_id, i.inv_make, i.inv_model, i.inv_year,
                   i.inv_price, i.inv_thumbnail
            FROM favorites f
            JOIN inventory i ON f.inv_id = i.inv_id
            WHERE f.account_id = ?
            ORDER BY f.favorite_id DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Favorites list failed: {}", e);
            Vec::new()
        })
    }

    pub async fn count_for_account(&self, account_id: i64) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM favorites WHERE account_id = ?")
            .bind(account_id)
            .fetch_one(&self.pool)
            .await
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{NewAccount, NewVehicle};
    use crate::db::{test_pool, AccountStore, InventoryStore};

    async fn fixtures(pool: &DbPool) -> (i64, i64) {
        let accounts = AccountStore::new(pool.clone());
        let inventory = InventoryStore::new(pool.clone());
        let account_id = accounts
            .create(NewAccount {
                first_name: "Faye",
                last_name: "Ortiz",
                email: "faye@x.com",
                password_hash: "$argon2id$fake",
                role: "customer",
            })
            .await
            .unwrap();
        let inv_id = inventory
            .add_vehicle(NewVehicle {
                classification_id: 1,
                make: "Brava",
                model: "Trailhead",
                year: 2019,
                description: "Rugged and ready for anything.",
                image: "/images/vehicles/trailhead.jpg",
                thumbnail: "/images/vehicles/trailhead-tn.jpg",
                price: 31000.0,
                miles: 40200,
                color: "Green",
            })
            .await
            .unwrap();
        (account_id, inv_id)
    }

    #[tokio::test]
    async fn add_check_list_remove() {
        let pool = test_pool().await;
        let (account_id, inv_id) = fixtures(&pool).await;
        let store = FavoriteStore::new(pool);

        assert!(!store.exists(account_id, inv_id).await);
        store.add(account_id, inv_id).await.unwrap();
        assert!(store.exists(account_id, inv_id).await);

        let listed = store.for_account(account_id).await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].inv_make, "Brava");
        assert_eq!(store.count_for_account(account_id).await, 1);

        assert!(store.remove(account_id, inv_id).await.unwrap());
        assert!(!store.exists(account_id, inv_id).await);
        // Removal of a missing pair reports false, not an error
        assert!(!store.remove(account_id, inv_id).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_pair_rejected() {
        let pool = test_pool().await;
        let (account_id, inv_id) = fixtures(&pool).await;
        let store = FavoriteStore::new(pool);

        store.add(account_id, inv_id).await.unwrap();
        let err = store.add(account_id, inv_id).await.unwrap_err();
        assert!(crate::db::is_unique_violation(&err));
    }

    #[tokio::test]
    async fn empty_account_lists_nothing() {
        let pool = test_pool().await;
        let store = FavoriteStore::new(pool);
        assert!(store.for_account(12345).await.is_empty());
        assert_eq!(store.count_for_account(12345).await, 0);
    }
}
