//! Identity, credentials, and the authorization gate.

pub mod error;
pub mod middleware;
pub mod session;
pub mod token;

use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::config::AuthConfig;
use crate::db::{AccountInfo, AccountStore, NewAccount};
use error::AuthError;

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash. Malformed hashes verify false.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Verify credentials against the account store.
///
/// Unknown email and wrong password both come back as
/// [`AuthError::CredentialMismatch`]; callers must not distinguish them.
/// No rate limiting or timing equalization is applied here — a known,
/// deliberate gap carried over from the behavior this replaces.
pub async fn login(
    accounts: &AccountStore,
    email: &str,
    password: &str,
) -> Result<AccountInfo, AuthError> {
    let account = accounts
        .by_email(email)
        .await
        .ok_or(AuthError::CredentialMismatch)?;

    if !verify_password(password, &account.password_hash) {
        return Err(AuthError::CredentialMismatch);
    }

    // The hash stays behind; only public fields travel further.
    Ok(AccountInfo::from(account))
}

/// Role predicate for the management gate. Distinguishes "not logged in"
/// (401) from "logged in with the wrong role" (403).
pub fn check_staff(identity: Option<&AccountInfo>) -> Result<(), AuthError> {
    match identity {
        None => Err(AuthError::AuthenticationRequired),
        Some(info) if info.is_staff() => Ok(()),
        Some(_) => Err(AuthError::Forbidden),
    }
}

/// Account mutations may only target the caller's own account, regardless
/// of role.
pub fn check_ownership(identity: &AccountInfo, account_id: i64) -> Result<(), AuthError> {
    if identity.account_id == account_id {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

/// Create the configured admin account if it does not exist yet. A no-op
/// when admin credentials are not configured.
pub async fn ensure_admin_account(accounts: &AccountStore, auth: &AuthConfig) -> Result<()> {
    let (Some(email), Some(password)) = (auth.admin_email.as_deref(), auth.admin_password.as_deref())
    else {
        return Ok(());
    };

    if accounts.by_email(email).await.is_some() {
        return Ok(());
    }

    let password_hash =
        hash_password(password).map_err(|e| anyhow::anyhow!("Failed to hash admin password: {}", e))?;
    accounts
        .create(NewAccount {
            first_name: "Site",
            last_name: "Admin",
            email,
            password_hash: &password_hash,
            role: "admin",
        })
        .await?;

    tracing::info!("Created admin account {}", email);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn info(account_id: i64, role: &str) -> AccountInfo {
        AccountInfo {
            account_id,
            first_name: "Tess".into(),
            last_name: "Moor".into(),
            email: "tess@x.com".into(),
            role: role.into(),
        }
    }

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("anything", "not-a-valid-hash"));
    }

    #[test]
    fn staff_gate_statuses() {
        assert!(matches!(
            check_staff(None),
            Err(AuthError::AuthenticationRequired)
        ));
        assert!(matches!(
            check_staff(Some(&info(1, "customer"))),
            Err(AuthError::Forbidden)
        ));
        assert!(check_staff(Some(&info(1, "employee"))).is_ok());
        assert!(check_staff(Some(&info(1, "Admin"))).is_ok());
    }

    #[test]
    fn ownership_mismatch_denied_regardless_of_role() {
        for role in ["customer", "employee", "admin"] {
            let identity = info(5, role);
            assert!(check_ownership(&identity, 5).is_ok());
            assert!(matches!(
                check_ownership(&identity, 7),
                Err(AuthError::Forbidden)
            ));
        }
    }

    #[tokio::test]
    async fn login_rejections_are_indistinguishable() {
        let accounts = AccountStore::new(test_pool().await);
        let hash = hash_password("secret-password-123").unwrap();
        accounts
            .create(crate::db::NewAccount {
                first_name: "E",
                last_name: "X",
                email: "e@x.com",
                password_hash: &hash,
                role: "customer",
            })
            .await
            .unwrap();

        let unknown = login(&accounts, "nobody@x.com", "whatever").await;
        let wrong = login(&accounts, "e@x.com", "wrong-password").await;
        assert_eq!(
            format!("{}", unknown.unwrap_err()),
            format!("{}", wrong.unwrap_err())
        );

        let ok = login(&accounts, "e@x.com", "secret-password-123")
            .await
            .unwrap();
        assert_eq!(ok.email, "e@x.com");
    }

    #[tokio::test]
    async fn admin_seed_is_idempotent() {
        let accounts = AccountStore::new(test_pool().await);
        let auth = AuthConfig {
            admin_email: Some("admin@x.com".into()),
            admin_password: Some("bootstrap-password".into()),
            ..AuthConfig::default()
        };

        ensure_admin_account(&accounts, &auth).await.unwrap();
        ensure_admin_account(&accounts, &auth).await.unwrap();
        assert_eq!(accounts.count().await, 1);
        assert_eq!(accounts.by_email("admin@x.com").await.unwrap().role, "admin");
    }

    #[tokio::test]
    async fn admin_seed_skipped_without_config() {
        let accounts = AccountStore::new(test_pool().await);
        ensure_admin_account(&accounts, &AuthConfig::default())
            .await
            .unwrap();
        assert_eq!(accounts.count().await, 0);
    }
}
