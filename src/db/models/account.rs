//! Account records and their store.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db::DbPool;

/// Full account row, password hash included. Never serialized into a
/// session, token, or template; use [`AccountInfo`] for that.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub account_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Public projection of an account: what sessions and bearer tokens carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AccountInfo {
    pub account_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
}

impl AccountInfo {
    /// Roles allowed through the inventory-management gate.
    /// Comparison is case-insensitive.
    pub fn is_staff(&self) -> bool {
        let role = self.role.to_ascii_lowercase();
        role == "employee" || role == "admin"
    }
}

impl From<Account> for AccountInfo {
    fn from(account: Account) -> Self {
        Self {
            account_id: account.account_id,
            first_name: account.first_name,
            last_name: account.last_name,
            email: account.email,
            role: account.role,
        }
    }
}

pub struct NewAccount<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
}

#[derive(Clone)]
pub struct AccountStore {
    pool: DbPool,
}

impl AccountStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Lookup by email, case-sensitive as stored. Store errors degrade to
    /// "no such account" rather than propagating.
    pub async fn by_email(&self, email: &str) -> Option<Account> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("Account lookup by email failed: {}", e);
                None
            })
    }

    pub async fn by_id(&self, account_id: i64) -> Option<Account> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE account_id = ?")
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("Account lookup by id failed: {}", e);
                None
            })
    }

    pub async fn create(&self, new: NewAccount<'_>) -> Result<i64, sqlx::Error> {
        let now = chrono::Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"
            INSERT INTO accounts (first_name, last_name, email, password_hash, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.first_name)
        .bind(new.last_name)
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.role)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update_profile(
        &self,
        account_id: i64,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<bool, sqlx::Error> {
        let now = chrono::Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET first_name = ?, last_name = ?, email = ?, updated_at = ?
            WHERE account_id = ?
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(&now)
        .bind(account_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn update_password(
        &self,
        account_id: i64,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let now = chrono::Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE accounts SET password_hash = ?, updated_at = ? WHERE account_id = ?",
        )
        .bind(password_hash)
        .bind(&now)
        .bind(account_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn new_account<'a>(email: &'a str) -> NewAccount<'a> {
        NewAccount {
            first_name: "Basil",
            last_name: "Vander",
            email,
            password_hash: "$argon2id$fake",
            role: "customer",
        }
    }

    #[test]
    fn staff_roles_are_case_insensitive() {
        let mut info = AccountInfo {
            account_id: 1,
            first_name: "A".into(),
            last_name: "B".into(),
            email: "a@b.c".into(),
            role: "Employee".into(),
        };
        assert!(info.is_staff());
        info.role = "ADMIN".into();
        assert!(info.is_staff());
        info.role = "customer".into();
        assert!(!info.is_staff());
    }

    #[tokio::test]
    async fn create_and_lookup() {
        let store = AccountStore::new(test_pool().await);
        let id = store.create(new_account("b@x.com")).await.unwrap();

        let by_email = store.by_email("b@x.com").await.unwrap();
        assert_eq!(by_email.account_id, id);
        assert_eq!(by_email.first_name, "Basil");

        assert!(store.by_email("nobody@x.com").await.is_none());
        assert!(store.by_id(id + 40).await.is_none());
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn duplicate_email_is_unique_violation() {
        let store = AccountStore::new(test_pool().await);
        store.create(new_account("dup@x.com")).await.unwrap();
        let err = store.create(new_account("dup@x.com")).await.unwrap_err();
        assert!(crate::db::is_unique_violation(&err));
    }

    #[tokio::test]
    async fn profile_and_password_updates() {
        let store = AccountStore::new(test_pool().await);
        let id = store.create(new_account("c@x.com")).await.unwrap();

        assert!(store
            .update_profile(id, "Cleo", "Vander", "cleo@x.com")
            .await
            .unwrap());
        let updated = store.by_id(id).await.unwrap();
        assert_eq!(updated.first_name, "Cleo");
        assert_eq!(updated.email, "cleo@x.com");

        assert!(store.update_password(id, "$argon2id$new").await.unwrap());
        assert_eq!(store.by_id(id).await.unwrap().password_hash, "$argon2id$new");

        // Missing rows report false, not an error
        assert!(!store.update_password(id + 99, "x").await.unwrap());
    }
}
