//! API Handlers
//!
//! HTTP request handlers exposing the cache repository for JSON documents.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{CacheRepository, JsonDocument};
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, CountResponse, DeleteResponse, DocumentResponse, HealthResponse, SetRequest,
    SetResponse, SetSpecificRequest, StatsResponse,
};

/// Application state shared across all handlers.
///
/// The repository needs no lock: it holds no mutable state besides atomic
/// counters, and the store serializes its own writes.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache repository
    pub repo: Arc<CacheRepository>,
}

impl AppState {
    /// Creates a new AppState owning the given repository.
    pub fn new(repo: CacheRepository) -> Self {
        Self::from_shared(Arc::new(repo))
    }

    /// Creates a new AppState from a repository shared with background tasks.
    pub fn from_shared(repo: Arc<CacheRepository>) -> Self {
        Self { repo }
    }
}

fn found(key: &str, doc: Option<JsonDocument>) -> Result<Json<DocumentResponse>> {
    doc.map(|doc| Json(doc.into()))
        .ok_or_else(|| CacheError::NotFound(key.to_string()))
}

/// Handler for PUT /docs/:key
///
/// Stores a plain entry with optional TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl();
    let doc = JsonDocument::new(key.clone(), req.value);
    state.repo.set(&doc, &key, ttl).await?;

    Ok(Json(SetResponse::new(key)))
}

/// Handler for GET /docs/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DocumentResponse>> {
    let doc = state.repo.get::<JsonDocument>(&key).await?;
    found(&key, doc)
}

/// Handler for DELETE /docs/:key
///
/// Removing a missing key succeeds.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.repo.remove(&key).await?;
    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for PUT /docs/:key/specific
///
/// Stores a specific entry; the sub-key is generated when the body has none.
pub async fn set_specific_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<SetSpecificRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl();
    let mut doc = JsonDocument::new(key.clone(), req.value);
    let sub_key = state
        .repo
        .set_specific_with_ttl(&mut doc, &key, req.sub_key.as_deref(), ttl)
        .await?;

    Ok(Json(SetResponse::specific(key, sub_key)))
}

/// Handler for GET /docs/:key/specific
///
/// Returns the most recently stored specific entry under the key.
pub async fn get_latest_specific_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DocumentResponse>> {
    let doc = state.repo.get_specific::<JsonDocument>(&key, None).await?;
    found(&key, doc)
}

/// Handler for GET /docs/:key/specific/:sub_key
pub async fn get_specific_handler(
    State(state): State<AppState>,
    Path((key, sub_key)): Path<(String, String)>,
) -> Result<Json<DocumentResponse>> {
    let doc = state
        .repo
        .get_specific::<JsonDocument>(&key, Some(&sub_key))
        .await?;
    found(&key, doc)
}

/// Handler for DELETE /docs/:key/specific
///
/// Removes every specific JSON entry under the key.
pub async fn delete_all_specific_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state
        .repo
        .remove_specific::<JsonDocument>(&key, None)
        .await?;
    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /docs/:key/specific/:sub_key
pub async fn delete_specific_handler(
    State(state): State<AppState>,
    Path((key, sub_key)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>> {
    state
        .repo
        .remove_specific::<JsonDocument>(&key, Some(&sub_key))
        .await?;
    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /docs
pub async fn clear_handler(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    state.repo.clear().await?;
    Ok(Json(ClearResponse::new(state.repo.collection())))
}

/// Handler for GET /count
pub async fn count_handler(State(state): State<AppState>) -> Result<Json<CountResponse>> {
    let count = state.repo.get_doc_count::<JsonDocument>().await?;
    Ok(Json(CountResponse::json_documents(count)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.repo.stats().into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
