pub mod auth;
pub mod config;
pub mod db;
pub mod web;

pub use db::DbPool;

use anyhow::Result;

use crate::auth::session::SessionStore;
use crate::auth::token::TokenIssuer;
use crate::config::Config;
use crate::db::{AccountStore, FavoriteStore, InventoryStore};

/// Shared application state, injected into handlers via axum `State`.
///
/// All stores borrow the same connection pool; none of them are
/// process-global singletons.
pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub tokens: TokenIssuer,
    pub accounts: AccountStore,
    pub sessions: SessionStore,
    pub inventory: InventoryStore,
    pub favorites: FavoriteStore,
}

impl AppState {
    /// Build the state for a running server. Fails if the token signing
    /// secret is unusable; that is a startup error, never a per-request one.
    pub fn new(config: Config, db: DbPool) -> Result<Self> {
        let tokens = TokenIssuer::new(&config.auth.token_secret, config.auth.token_ttl_secs)?;
        Ok(Self {
            accounts: AccountStore::new(db.clone()),
            sessions: SessionStore::new(db.clone(), config.auth.session_ttl_secs),
            inventory: InventoryStore::new(db.clone()),
            favorites: FavoriteStore::new(db.clone()),
            config,
            db,
            tokens,
        })
    }
}
