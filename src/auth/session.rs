//! Server-side sessions backed by the database.
//!
//! A session row is a snapshot of the account's public fields taken at
//! login. It is trusted as-is on the request fast path; the bearer token
//! is only consulted when no live session matches.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sqlx::FromRow;

use crate::db::{AccountInfo, DbPool};

#[derive(Debug, FromRow)]
struct SessionRow {
    account_id: i64,
    first_name: String,
    last_name: String,
    email: String,
    role: String,
    expires_at: String,
}

/// Generate an opaque session identifier
fn generate_session_id() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

#[derive(Clone)]
pub struct SessionStore {
    pool: DbPool,
    ttl_secs: i64,
}

impl SessionStore {
    pub fn new(pool: DbPool, ttl_secs: i64) -> Self {
        Self { pool, ttl_secs }
    }

    /// Create a session for a freshly authenticated account and return its
    /// opaque identifier.
    pub async fn create(&self, info: &AccountInfo) -> Result<String, sqlx::Error> {
        let session_id = generate_session_id();
        let now = Utc::now();
        let expires = now + Duration::seconds(self.ttl_secs);

        sqlx::query(
            r#"
            INSERT INTO sessions (session_id, account_id, first_name, last_name, email, role, created_at, expires_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&session_id)
        .bind(info.account_id)
        .bind(&info.first_name)
        .bind(&info.last_name)
        .bind(&info.email)
        .bind(&info.role)
        .bind(now.to_rfc3339())
        .bind(expires.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(session_id)
    }

    /// Resolve a session id to the account snapshot it holds. Expired or
    /// missing sessions, and store failures, all resolve to `None`.
    pub async fn get(&self, session_id: &str) -> Option<AccountInfo> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT account_id, first_name, last_name, email, role, expires_at FROM sessions WHERE session_id = ?",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Session lookup failed: {}", e);
            None
        })?;

        let expires = DateTime::parse_from_rfc3339(&row.expires_at).ok()?;
        if expires <= Utc::now() {
            return None;
        }

        Some(AccountInfo {
            account_id: row.account_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            role: row.role,
        })
    }

    /// Destroy a session. Succeeds whether or not the session existed.
    pub async fn destroy(&self, session_id: &str) {
        if let Err(e) = sqlx::query("DELETE FROM sessions WHERE session_id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await
        {
            tracing::error!("Session destroy failed: {}", e);
        }
    }

    /// Drop rows past their expiry. Called at startup; expired sessions
    /// are also rejected at read time, so this is housekeeping only.
    pub async fn purge_expired(&self) -> u64 {
        let now = Utc::now().to_rfc3339();
        match sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(&now)
            .execute(&self.pool)
            .await
        {
            Ok(result) => result.rows_affected(),
            Err(e) => {
                tracing::error!("Session purge failed: {}", e);
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn info() -> AccountInfo {
        AccountInfo {
            account_id: 3,
            first_name: "Rae".into(),
            last_name: "Quill".into(),
            email: "rae@x.com".into(),
            role: "customer".into(),
        }
    }

    #[tokio::test]
    async fn create_get_destroy() {
        let store = SessionStore::new(test_pool().await, 3600);
        let sid = store.create(&info()).await.unwrap();
        assert_eq!(sid.len(), 64);

        assert_eq!(store.get(&sid).await, Some(info()));
        assert!(store.get("no-such-session").await.is_none());

        store.destroy(&sid).await;
        assert!(store.get(&sid).await.is_none());
        // Destroying again is fine
        store.destroy(&sid).await;
    }

    #[tokio::test]
    async fn expired_sessions_resolve_to_none() {
        let store = SessionStore::new(test_pool().await, -60);
        let sid = store.create(&info()).await.unwrap();
        assert!(store.get(&sid).await.is_none());
    }

    #[tokio::test]
    async fn purge_removes_only_expired_rows() {
        let pool = test_pool().await;
        let expired = SessionStore::new(pool.clone(), -60);
        let live = SessionStore::new(pool.clone(), 3600);

        expired.create(&info()).await.unwrap();
        let keep = live.create(&info()).await.unwrap();

        assert_eq!(live.purge_expired().await, 1);
        assert!(live.get(&keep).await.is_some());
    }

    #[test]
    fn session_ids_are_unique() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert_ne!(a, b);
    }
}
