pub mod config;
pub mod entries;
pub mod ondemand;
pub mod store;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use guestbook_db::Database;

use crate::config::Config;
use crate::store::AppState;

/// All guestbook routes, mounted under `prefix` (already normalized, see
/// [`config::normalize_prefix`]).
pub fn router(store: AppState, prefix: &str) -> Router {
    let api = Router::new()
        .route("/guestbook", get(entries::list_entries).post(entries::create_entry))
        .route("/guestbook/{id}", put(entries::update_entry).delete(entries::delete_entry))
        .route("/health", get(entries::health))
        .with_state(store);

    let app = if prefix.is_empty() {
        api
    } else {
        Router::new().nest(prefix, api)
    };

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Opens the database and assembles the router. Both lifecycle modes go
/// through here so they serve identical routes.
pub fn build_app(config: &Config) -> anyhow::Result<Router> {
    let db = Database::open(&config.db_path)?;
    let store: AppState = Arc::new(db);
    Ok(router(store, &config.api_prefix))
}
