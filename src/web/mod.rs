//! HTTP surface: routing, template rendering, and the page handlers.

pub mod account;
pub mod favorites;
pub mod flash;
pub mod inventory;
pub mod templates;
pub mod validation;

pub use templates::*;

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tower::Layer as _;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::auth::middleware::{require_login, require_staff, resolve_identity};
use crate::AppState;

/// Render a template to an HTML response
pub fn render_template<T: Template>(template: T) -> Response {
    render_with_status(StatusCode::OK, template)
}

/// 302 Found redirect
pub fn redirect(to: &str) -> Response {
    (StatusCode::FOUND, [(axum::http::header::LOCATION, to)]).into_response()
}

pub(crate) fn render_with_status<T: Template>(status: StatusCode, template: T) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Template render failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
                .into_response()
        }
    }
}

pub async fn render_server_error(state: &AppState) -> Response {
    let template = ErrorTemplate {
        title: "Server Error".to_string(),
        nav: state.inventory.classifications().await,
        notice: None,
        message: "Oh no! There was a crash. Maybe try a different route?".to_string(),
    };
    render_with_status(StatusCode::INTERNAL_SERVER_ERROR, template)
}

pub async fn render_not_found(state: &AppState) -> Response {
    let template = ErrorTemplate {
        title: "Not Found".to_string(),
        nav: state.inventory.classifications().await,
        notice: None,
        message: "Sorry, we appear to have lost that page.".to_string(),
    };
    render_with_status(StatusCode::NOT_FOUND, template)
}

async fn home(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let (jar, notice) = flash::take(jar);
    let template = HomeTemplate {
        title: "Home".to_string(),
        nav: state.inventory.classifications().await,
        notice,
    };
    (jar, render_template(template)).into_response()
}

async fn not_found(State(state): State<Arc<AppState>>) -> Response {
    render_not_found(&state).await
}

/// Build the application router.
///
/// Identity resolution wraps everything; the login and staff gates only
/// wrap the route groups that need them. Trailing slashes are trimmed
/// before routing so `/account/` and `/account` hit the same handler;
/// the trim wraps the router itself since `Router::layer` middleware
/// runs after path matching.
pub fn create_router(state: Arc<AppState>) -> NormalizePath<Router> {
    let account_public = Router::new()
        .route(
            "/login",
            get(account::login_view).post(account::login_submit),
        )
        .route(
            "/register",
            get(account::register_view).post(account::register_submit),
        )
        .route("/logout", get(account::logout));

    let account_protected = Router::new()
        .route("/", get(account::management_view))
        .route("/update/:account_id", get(account::update_view))
        .route("/update", post(account::update_submit))
        .route("/update-password", post(account::update_password))
        .route("/favorites", get(favorites::list_view))
        .route("/favorites/add", post(favorites::add))
        .route("/favorites/remove", post(favorites::remove))
        .layer(middleware::from_fn(require_login));

    let inv_public = Router::new()
        .route(
            "/type/:classification_id",
            get(inventory::classification_view),
        )
        .route("/detail/:inv_id", get(inventory::detail_view))
        .route("/error", get(inventory::trigger_error));

    let inv_management = Router::new()
        .route("/", get(inventory::management_view))
        .route(
            "/add-classification",
            get(inventory::add_classification_view).post(inventory::add_classification_submit),
        )
        .route(
            "/add-vehicle",
            get(inventory::add_vehicle_view).post(inventory::add_vehicle_submit),
        )
        .route(
            "/edit/:inv_id",
            get(inventory::edit_vehicle_view).post(inventory::edit_vehicle_submit),
        )
        .route("/delete", post(inventory::delete_vehicle))
        .layer(middleware::from_fn_with_state(state.clone(), require_staff));

    let router = Router::new()
        .route("/", get(home))
        .nest("/account", account_public.merge(account_protected))
        .nest("/inv", inv_public.merge(inv_management))
        .nest_service("/public", ServeDir::new(&state.config.server.public_dir))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_identity,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
