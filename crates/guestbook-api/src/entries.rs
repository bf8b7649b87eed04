use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use guestbook_types::EntryRequest;

use crate::store::AppState;

/// Store calls touch SQLite, so they run off the async runtime.
async fn blocking<F, T>(f: F) -> Result<T, StatusCode>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| { error!("spawn_blocking join error: {}", e); StatusCode::INTERNAL_SERVER_ERROR })?
        .map_err(|e| { error!("Entry store error: {:#}", e); StatusCode::INTERNAL_SERVER_ERROR })
}

fn validate(req: &EntryRequest) -> Result<(), StatusCode> {
    match req.missing_field() {
        Some(field) => {
            warn!("Rejected entry with blank {}", field);
            Err(StatusCode::BAD_REQUEST)
        }
        None => Ok(()),
    }
}

/// GET /guestbook
pub async fn list_entries(State(store): State<AppState>) -> Result<impl IntoResponse, StatusCode> {
    let entries = blocking(move || store.list_entries()).await?;
    Ok(Json(entries))
}

/// POST /guestbook
pub async fn create_entry(
    State(store): State<AppState>,
    Json(req): Json<EntryRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    validate(&req)?;

    let entry = blocking(move || store.create_entry(&req.name, &req.message)).await?;
    info!(id = %entry.id, "Entry created");

    Ok((StatusCode::CREATED, Json(entry)))
}

/// PUT /guestbook/{id}
pub async fn update_entry(
    State(store): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EntryRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    validate(&req)?;

    let entry = blocking(move || store.update_entry(id, &req.name, &req.message))
        .await?
        .ok_or(StatusCode::NOT_FOUND)?;
    info!(id = %entry.id, "Entry updated");

    Ok(Json(entry))
}

/// DELETE /guestbook/{id}
pub async fn delete_entry(
    State(store): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, StatusCode> {
    if !blocking(move || store.delete_entry(id)).await? {
        return Err(StatusCode::NOT_FOUND);
    }
    info!(id = %id, "Entry deleted");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
