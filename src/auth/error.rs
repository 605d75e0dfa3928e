//! Typed rejections for the identity/authorization layer.
//!
//! Authentication and authorization outcomes are values, never panics or
//! generic errors crossing the middleware boundary. Only `Signing` is
//! allowed to surface as a 500.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// No identity on the request where one is required
    #[error("authentication required")]
    AuthenticationRequired,

    /// Identity present but role or ownership check failed
    #[error("insufficient privileges")]
    Forbidden,

    /// Login rejected. Deliberately carries no detail: unknown email and
    /// wrong password must be indistinguishable to the caller.
    #[error("invalid credentials")]
    CredentialMismatch,

    /// Bearer token failed verification (bad signature, expired, malformed).
    /// Degrades the request to anonymous, never a hard rejection by itself.
    #[error("bearer token rejected: {0}")]
    TokenRejected(#[source] jsonwebtoken::errors::Error),

    /// Token could not be signed. Configuration-level failure.
    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}
