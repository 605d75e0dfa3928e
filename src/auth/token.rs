//! Signed bearer tokens carried in the "jwt" cookie.
//!
//! Tokens are self-contained HS256 JWTs over the account's public fields.
//! Verification needs only the signing secret, no store lookup. The
//! password hash never enters the claims.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::error::AuthError;
use crate::db::AccountInfo;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: i64,
    first_name: String,
    last_name: String,
    email: String,
    role: String,
    iat: i64,
    exp: i64,
}

pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenIssuer {
    /// A missing or empty secret is a configuration error and fails here,
    /// at startup, never per request.
    pub fn new(secret: &str, ttl_secs: i64) -> anyhow::Result<Self> {
        if secret.trim().is_empty() {
            anyhow::bail!("auth.token_secret must not be empty");
        }
        if ttl_secs <= 0 {
            anyhow::bail!("auth.token_ttl_secs must be positive, got {}", ttl_secs);
        }
        let mut validation = Validation::default();
        validation.leeway = 0;
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs,
        })
    }

    pub fn issue(&self, info: &AccountInfo) -> Result<String, AuthError> {
        self.issue_at(info, Utc::now().timestamp())
    }

    /// Issue with an explicit issuance time. Exposed within the crate so
    /// expiry behavior can be exercised without sleeping.
    pub(crate) fn issue_at(&self, info: &AccountInfo, iat: i64) -> Result<String, AuthError> {
        let claims = Claims {
            sub: info.account_id,
            first_name: info.first_name.clone(),
            last_name: info.last_name.clone(),
            email: info.email.clone(),
            role: info.role.clone(),
            iat,
            exp: iat + self.ttl_secs,
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(AuthError::Signing)
    }

    pub fn verify(&self, token: &str) -> Result<AccountInfo, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(AuthError::TokenRejected)?;
        let claims = data.claims;
        Ok(AccountInfo {
            account_id: claims.sub,
            first_name: claims.first_name,
            last_name: claims.last_name,
            email: claims.email,
            role: claims.role,
        })
    }
}
