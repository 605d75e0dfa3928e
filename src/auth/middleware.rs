//! Request middleware: identity resolution and the authorization gate.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

use crate::auth::error::AuthError;
use crate::config::AuthConfig;
use crate::db::AccountInfo;
use crate::web::{self, flash, LoginTemplate};
use crate::AppState;

/// Bearer token cookie
pub const JWT_COOKIE: &str = "jwt";
/// Opaque server-side session id cookie
pub const SESSION_COOKIE: &str = "sid";

pub fn token_cookie(token: String, config: &AuthConfig) -> Cookie<'static> {
    Cookie::build((JWT_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies)
        .max_age(time::Duration::seconds(config.token_ttl_secs))
        .build()
}

pub fn session_cookie(session_id: String, config: &AuthConfig) -> Cookie<'static> {
    // No max-age: the browser drops it with the session, the server-side
    // row has its own expiry.
    Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies)
        .build()
}

pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").build()
}

/// Resolve the caller's identity and stash it in request extensions.
///
/// Session fast path first: a live server-side session is trusted without
/// any cryptographic check. Otherwise the bearer-token cookie is verified;
/// a bad token clears the cookie and degrades the request to anonymous
/// rather than rejecting it. Absent identity is a valid outcome.
pub async fn resolve_identity(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Some(info) = state.sessions.get(cookie.value()).await {
            req.extensions_mut().insert(info);
            return next.run(req).await;
        }
    }

    let mut drop_token = false;
    if let Some(cookie) = jar.get(JWT_COOKIE) {
        match state.tokens.verify(cookie.value()) {
            Ok(info) => {
                req.extensions_mut().insert(info);
            }
            Err(e) => {
                tracing::debug!("Discarding bearer token: {}", e);
                drop_token = true;
            }
        }
    }

    let response = next.run(req).await;
    if drop_token {
        let jar = jar.remove(removal_cookie(JWT_COOKIE));
        (jar, response).into_response()
    } else {
        response
    }
}

/// Gate for routes that only need a logged-in account. Anonymous callers
/// are redirected to the login page with a notice.
pub async fn require_login(jar: CookieJar, req: Request, next: Next) -> Response {
    if req.extensions().get::<AccountInfo>().is_some() {
        return next.run(req).await;
    }
    let jar = flash::set(jar, "Please log in to access your account.");
    (jar, web::redirect("/account/login")).into_response()
}

/// Gate for inventory management: employee or admin only.
///
/// 401 when nobody is logged in, 403 when the role is wrong; both render
/// the login view with a notice instead of a bare error page.
pub async fn require_staff(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let identity = req.extensions().get::<AccountInfo>();
    match crate::auth::check_staff(identity) {
        Ok(()) => next.run(req).await,
        Err(err) => {
            let (status, notice) = match err {
                AuthError::AuthenticationRequired => (
                    StatusCode::UNAUTHORIZED,
                    "Please log in with an employee or admin account.",
                ),
                _ => (
                    StatusCode::FORBIDDEN,
                    "Your account does not have access to inventory management.",
                ),
            };
            let template = LoginTemplate {
                title: "Login".to_string(),
                nav: state.inventory.classifications().await,
                notice: Some(notice.to_string()),
                errors: Vec::new(),
                email: String::new(),
            };
            web::render_with_status(status, template)
        }
    }
}

/// Extractor for handlers behind `require_login`; falls back to a login
/// redirect if a gate was somehow bypassed.
#[async_trait]
impl<S> FromRequestParts<S> for AccountInfo
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AccountInfo>()
            .cloned()
            .ok_or_else(|| web::redirect("/account/login"))
    }
}
