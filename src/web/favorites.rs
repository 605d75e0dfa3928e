//! Saved-vehicle routes. All of these sit behind the login gate.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

use crate::db::AccountInfo;
use crate::web::templates::FavoritesTemplate;
use crate::web::{flash, redirect, render_template};
use crate::AppState;

pub async fn list_view(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    identity: AccountInfo,
) -> Response {
    let (jar, notice) = flash::take(jar);
    let template = FavoritesTemplate {
        title: "My Favorites".to_string(),
        nav: state.inventory.classifications().await,
        notice,
        favorites: state.favorites.for_account(identity.account_id).await,
    };
    (jar, render_template(template)).into_response()
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct FavoriteForm {
    /// Vehicle id as submitted; parsed rather than extracted so a garbled
    /// form degrades to a notice instead of a 422.
    inv_id: String,
    return_to: Option<String>,
}

/// Only redirect back to paths on this site.
fn safe_return(return_to: Option<String>) -> String {
    match return_to {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/account/favorites".to_string(),
    }
}

pub async fn add(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    identity: AccountInfo,
    Form(form): Form<FavoriteForm>,
) -> Response {
    let back = safe_return(form.return_to);
    let inv_id = match form.inv_id.trim().parse::<i64>() {
        Ok(id) => id,
        Err(_) => {
            let jar = flash::set(jar, "That vehicle could not be found.");
            return (jar, redirect(&back)).into_response();
        }
    };

    // The vehicle must still exist; favorites never point at ghosts
    if state.inventory.vehicle_by_id(inv_id).await.is_none() {
        let jar = flash::set(jar, "That vehicle could not be found.");
        return (jar, redirect(&back)).into_response();
    }

    let jar = match state.favorites.add(identity.account_id, inv_id).await {
        Ok(_) => flash::set(jar, "Vehicle saved to your favorites."),
        Err(e) if crate::db::is_unique_violation(&e) => {
            // Already saved, treat as success
            flash::set(jar, "Vehicle saved to your favorites.")
        }
        Err(e) => {
            tracing::error!("Failed to save favorite: {}", e);
            flash::set(jar, "Sorry, the vehicle could not be saved.")
        }
    };
    (jar, redirect(&back)).into_response()
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    identity: AccountInfo,
    Form(form): Form<FavoriteForm>,
) -> Response {
    let back = safe_return(form.return_to);
    let jar = match form.inv_id.trim().parse::<i64>() {
        Ok(inv_id) => match state.favorites.remove(identity.account_id, inv_id).await {
            Ok(_) => flash::set(jar, "Vehicle removed from your favorites."),
            Err(e) => {
                tracing::error!("Failed to remove favorite: {}", e);
                flash::set(jar, "Sorry, the vehicle could not be removed.")
            }
        },
        Err(_) => flash::set(jar, "That vehicle could not be found."),
    };
    (jar, redirect(&back)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn return_paths_stay_on_site() {
        assert_eq!(safe_return(Some("/inv/detail/3".into())), "/inv/detail/3");
        assert_eq!(safe_return(None), "/account/favorites");
        assert_eq!(
            safe_return(Some("https://evil.example".into())),
            "/account/favorites"
        );
        assert_eq!(
            safe_return(Some("//evil.example".into())),
            "/account/favorites"
        );
    }
}
