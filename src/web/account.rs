//! Account routes: login, registration, management, profile updates, logout.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::middleware::{removal_cookie, session_cookie, token_cookie, JWT_COOKIE, SESSION_COOKIE};
use crate::auth::{self, check_ownership};
use crate::db::{AccountInfo, NewAccount};
use crate::web::templates::{AccountTemplate, LoginTemplate, RegisterTemplate, UpdateAccountTemplate};
use crate::web::{
    flash, redirect, render_server_error, render_template, render_with_status, validation,
};
use crate::AppState;

pub async fn login_view(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let (jar, notice) = flash::take(jar);
    let template = LoginTemplate {
        title: "Login".to_string(),
        nav: state.inventory.classifications().await,
        notice,
        errors: Vec::new(),
        email: String::new(),
    };
    (jar, render_template(template)).into_response()
}

// Forms default missing fields to empty values so a stripped-down
// request gets the validation error list, not a bare 422.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginForm {
    email: String,
    password: String,
}

pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let mut errors = Vec::new();
    if let Err(e) = validation::validate_email(&form.email) {
        errors.push(e);
    }
    if form.password.is_empty() {
        errors.push("Password is required.".to_string());
    }
    if !errors.is_empty() {
        let template = LoginTemplate {
            title: "Login".to_string(),
            nav: state.inventory.classifications().await,
            notice: None,
            errors,
            email: form.email,
        };
        return render_with_status(StatusCode::BAD_REQUEST, template);
    }

    match auth::login(&state.accounts, &form.email, &form.password).await {
        Ok(info) => establish_identity(&state, jar, &info, "/account/").await,
        Err(_) => {
            // Unknown email and wrong password get the same answer
            let template = LoginTemplate {
                title: "Login".to_string(),
                nav: state.inventory.classifications().await,
                notice: Some("Please check your credentials and try again.".to_string()),
                errors: Vec::new(),
                email: form.email,
            };
            render_with_status(StatusCode::BAD_REQUEST, template)
        }
    }
}

/// Create a fresh session row and bearer token for `info`, set both
/// cookies, and redirect. Used at login and again after profile updates
/// so neither projection goes stale.
async fn establish_identity(
    state: &AppState,
    jar: CookieJar,
    info: &AccountInfo,
    to: &str,
) -> Response {
    // Any previous session for this browser is replaced outright
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.destroy(cookie.value()).await;
    }

    let session_id = match state.sessions.create(info).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to create session: {}", e);
            return render_server_error(state).await;
        }
    };
    let token = match state.tokens.issue(info) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Failed to sign bearer token: {}", e);
            state.sessions.destroy(&session_id).await;
            return render_server_error(state).await;
        }
    };

    let jar = jar
        .add(session_cookie(session_id, &state.config.auth))
        .add(token_cookie(token, &state.config.auth));
    (jar, redirect(to)).into_response()
}

pub async fn register_view(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let (jar, notice) = flash::take(jar);
    let template = RegisterTemplate {
        title: "Register".to_string(),
        nav: state.inventory.classifications().await,
        notice,
        errors: Vec::new(),
        first_name: String::new(),
        last_name: String::new(),
        email: String::new(),
    };
    (jar, render_template(template)).into_response()
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct RegisterForm {
    first_name: String,
    last_name: String,
    email: String,
    password: String,
}

pub async fn register_submit(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let mut errors = Vec::new();
    for check in [
        validation::validate_name("First name", &form.first_name),
        validation::validate_name("Last name", &form.last_name),
        validation::validate_email(&form.email),
        validation::validate_password_strength(&form.password),
    ] {
        if let Err(e) = check {
            errors.push(e);
        }
    }

    let rerender = |errors: Vec<String>, notice: Option<String>, nav| {
        render_with_status(
            StatusCode::BAD_REQUEST,
            RegisterTemplate {
                title: "Register".to_string(),
                nav,
                notice,
                errors,
                first_name: form.first_name.clone(),
                last_name: form.last_name.clone(),
                email: form.email.clone(),
            },
        )
    };

    if !errors.is_empty() {
        let nav = state.inventory.classifications().await;
        return rerender(errors, None, nav);
    }

    let password_hash = match auth::hash_password(&form.password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("Password hashing failed: {}", e);
            return render_server_error(&state).await;
        }
    };

    let created = state
        .accounts
        .create(NewAccount {
            first_name: form.first_name.trim(),
            last_name: form.last_name.trim(),
            email: &form.email,
            password_hash: &password_hash,
            role: "customer",
        })
        .await;

    match created {
        Ok(_) => {
            let message = format!(
                "Congratulations {}, you're registered and can now log in.",
                form.first_name.trim()
            );
            let jar = flash::set(jar, &message);
            (jar, redirect("/account/login")).into_response()
        }
        Err(e) if crate::db::is_unique_violation(&e) => {
            let nav = state.inventory.classifications().await;
            rerender(
                vec!["That email is already registered.".to_string()],
                None,
                nav,
            )
        }
        Err(e) => {
            tracing::error!("Registration failed: {}", e);
            render_server_error(&state).await
        }
    }
}

pub async fn management_view(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    identity: AccountInfo,
) -> Response {
    let (jar, notice) = flash::take(jar);
    let staff = identity.is_staff();
    let template = AccountTemplate {
        title: "Account Management".to_string(),
        nav: state.inventory.classifications().await,
        notice,
        account: identity,
        staff,
    };
    (jar, render_template(template)).into_response()
}

pub async fn update_view(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    identity: AccountInfo,
    Path(account_id): Path<i64>,
) -> Response {
    if check_ownership(&identity, account_id).is_err() {
        let jar = flash::set(jar, "You do not have permission to access that account.");
        return (jar, redirect("/account/")).into_response();
    }

    let (jar, notice) = flash::take(jar);
    // Fall back to the identity snapshot if the row vanished underneath us
    let (first_name, last_name, email) = match state.accounts.by_id(account_id).await {
        Some(account) => (account.first_name, account.last_name, account.email),
        None => (identity.first_name, identity.last_name, identity.email),
    };

    let template = UpdateAccountTemplate {
        title: "Update Account".to_string(),
        nav: state.inventory.classifications().await,
        notice,
        errors: Vec::new(),
        first_name,
        last_name,
        email,
        account_id,
    };
    (jar, render_template(template)).into_response()
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct UpdateForm {
    first_name: String,
    last_name: String,
    email: String,
    account_id: i64,
}

pub async fn update_submit(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    identity: AccountInfo,
    Form(form): Form<UpdateForm>,
) -> Response {
    if check_ownership(&identity, form.account_id).is_err() {
        let jar = flash::set(jar, "You do not have permission to update that account.");
        return (jar, redirect("/account/")).into_response();
    }

    let mut errors = Vec::new();
    for check in [
        validation::validate_name("First name", &form.first_name),
        validation::validate_name("Last name", &form.last_name),
        validation::validate_email(&form.email),
    ] {
        if let Err(e) = check {
            errors.push(e);
        }
    }

    let rerender = |errors: Vec<String>, status: StatusCode, nav| {
        render_with_status(
            status,
            UpdateAccountTemplate {
                title: "Update Account".to_string(),
                nav,
                notice: None,
                errors,
                first_name: form.first_name.clone(),
                last_name: form.last_name.clone(),
                email: form.email.clone(),
                account_id: form.account_id,
            },
        )
    };

    if !errors.is_empty() {
        let nav = state.inventory.classifications().await;
        return rerender(errors, StatusCode::BAD_REQUEST, nav);
    }

    let updated = state
        .accounts
        .update_profile(
            form.account_id,
            form.first_name.trim(),
            form.last_name.trim(),
            &form.email,
        )
        .await;

    match updated {
        Ok(true) => {
            // Re-derive both identity projections from the stored row
            match state.accounts.by_id(form.account_id).await {
                Some(account) => {
                    let info = AccountInfo::from(account);
                    let jar = flash::set(jar, "Account updated successfully.");
                    establish_identity(&state, jar, &info, "/account/").await
                }
                None => render_server_error(&state).await,
            }
        }
        Ok(false) => {
            let nav = state.inventory.classifications().await;
            rerender(
                vec!["Sorry, the update failed.".to_string()],
                StatusCode::INTERNAL_SERVER_ERROR,
                nav,
            )
        }
        Err(e) if crate::db::is_unique_violation(&e) => {
            let nav = state.inventory.classifications().await;
            rerender(
                vec!["That email is already registered.".to_string()],
                StatusCode::BAD_REQUEST,
                nav,
            )
        }
        Err(e) => {
            tracing::error!("Account update failed: {}", e);
            let nav = state.inventory.classifications().await;
            rerender(
                vec!["Sorry, the update failed.".to_string()],
                StatusCode::INTERNAL_SERVER_ERROR,
                nav,
            )
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct PasswordForm {
    password: String,
    account_id: i64,
}

pub async fn update_password(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    identity: AccountInfo,
    Form(form): Form<PasswordForm>,
) -> Response {
    if check_ownership(&identity, form.account_id).is_err() {
        let jar = flash::set(jar, "You do not have permission to update that account.");
        return (jar, redirect("/account/")).into_response();
    }

    if let Err(e) = validation::validate_password_strength(&form.password) {
        let template = UpdateAccountTemplate {
            title: "Update Account".to_string(),
            nav: state.inventory.classifications().await,
            notice: None,
            errors: vec![e],
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            email: identity.email.clone(),
            account_id: form.account_id,
        };
        return render_with_status(StatusCode::BAD_REQUEST, template);
    }

    let password_hash = match auth::hash_password(&form.password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("Password hashing failed: {}", e);
            return render_server_error(&state).await;
        }
    };

    let jar = match state
        .accounts
        .update_password(form.account_id, &password_hash)
        .await
    {
        Ok(true) => flash::set(jar, "Password updated successfully."),
        Ok(false) | Err(_) => flash::set(jar, "Sorry, the password update failed."),
    };
    (jar, redirect("/account/")).into_response()
}

/// Unconditional logout: clears both cookies and the server-side session.
/// Succeeds even when no session existed.
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.destroy(cookie.value()).await;
    }
    let jar = jar
        .remove(removal_cookie(JWT_COOKIE))
        .remove(removal_cookie(SESSION_COOKIE));
    (jar, redirect("/")).into_response()
}
