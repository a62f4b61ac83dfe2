//! StreamMark REST backend.
//!
//! In-memory backend for the overlay dashboard: overlay CRUD plus stream
//! settings, served over JSON.
//!
//! ## Endpoints
//!
//! ```text
//! GET    /api/health
//! GET    /api/overlays
//! POST   /api/overlays
//! GET    /api/overlays/{id}
//! PUT    /api/overlays/{id}
//! DELETE /api/overlays/{id}
//! GET    /api/settings
//! PUT    /api/settings
//! ```
//!
//! Responses are enveloped: `{ "overlay": … }`, `{ "overlays": […] }`,
//! `{ "settings": … }`, or `{ "error": "…" }` with a 4xx status.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use streammark_core::{Overlay, OverlayDraft, OverlayId, OverlayPatch, StreamSettings};

/// Default bind address, overridable via `STREAMMARK_ADDR`.
const DEFAULT_ADDR: &str = "0.0.0.0:5000";

/// Current time as an RFC 3339 string.
fn now_rfc3339() -> Option<String> {
    OffsetDateTime::now_utc().format(&Rfc3339).ok()
}

/// API error with the dashboard's `{ "error": … }` body.
#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Shared application state.
///
/// The overlay collection keeps insertion order; clients use it verbatim as
/// list display order.
#[derive(Default)]
struct AppState {
    overlays: RwLock<Vec<Overlay>>,
    settings: RwLock<StreamSettings>,
}

impl AppState {
    fn new() -> Self {
        Self::default()
    }

    /// List all overlays in insertion order.
    async fn list(&self) -> Vec<Overlay> {
        self.overlays.read().await.clone()
    }

    /// Create an overlay from a draft, assigning the id and timestamps.
    async fn create(&self, draft: OverlayDraft) -> Result<Overlay, ApiError> {
        draft
            .validate()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        let now = now_rfc3339();
        let overlay = Overlay {
            id: Uuid::new_v4(),
            kind: draft.kind,
            content: draft.content,
            position: draft.position,
            size: draft.size,
            created_at: now.clone(),
            updated_at: now,
        };
        self.overlays.write().await.push(overlay.clone());
        Ok(overlay)
    }

    /// Look up an overlay by id.
    async fn get(&self, id: OverlayId) -> Option<Overlay> {
        self.overlays.read().await.iter().find(|o| o.id == id).cloned()
    }

    /// Merge a patch into an overlay, returning the canonical entity.
    async fn update(&self, id: OverlayId, patch: OverlayPatch) -> Option<Overlay> {
        let mut overlays = self.overlays.write().await;
        let overlay = overlays.iter_mut().find(|o| o.id == id)?;
        overlay.apply(&patch);
        overlay.updated_at = now_rfc3339();
        Some(overlay.clone())
    }

    /// Remove an overlay. Returns false if the id is unknown.
    async fn delete(&self, id: OverlayId) -> bool {
        let mut overlays = self.overlays.write().await;
        let before = overlays.len();
        overlays.retain(|o| o.id != id);
        overlays.len() != before
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "streammark_server=info,tower_http=info".into()),
        )
        .init();

    let state = Arc::new(AppState::new());

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/overlays", get(list_overlays).post(create_overlay))
        .route(
            "/api/overlays/{id}",
            get(get_overlay).put(update_overlay).delete(delete_overlay),
        )
        .route("/api/settings", get(get_settings).put(put_settings))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr: SocketAddr = std::env::var("STREAMMARK_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()
        .expect("invalid STREAMMARK_ADDR");
    info!("StreamMark backend listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Health check.
async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": now_rfc3339(),
    }))
}

async fn list_overlays(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({ "overlays": state.list().await }))
}

async fn create_overlay(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<OverlayDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let overlay = state.create(draft).await?;
    info!("created overlay {}", overlay.id);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "overlay created",
            "overlay": overlay,
        })),
    ))
}

async fn get_overlay(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let overlay = state
        .get(id)
        .await
        .ok_or_else(|| ApiError::NotFound("overlay not found".to_string()))?;
    Ok(Json(json!({ "overlay": overlay })))
}

async fn update_overlay(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<OverlayPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let overlay = state
        .update(id, patch)
        .await
        .ok_or_else(|| ApiError::NotFound("overlay not found".to_string()))?;
    Ok(Json(json!({
        "message": "overlay updated",
        "overlay": overlay,
    })))
}

async fn delete_overlay(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.delete(id).await {
        return Err(ApiError::NotFound("overlay not found".to_string()));
    }
    info!("deleted overlay {}", id);
    Ok(Json(json!({ "message": "overlay deleted" })))
}

async fn get_settings(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let settings = state.settings.read().await.clone();
    Json(json!({ "settings": settings }))
}

async fn put_settings(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<StreamSettings>,
) -> impl IntoResponse {
    *state.settings.write().await = settings.clone();
    info!("stream settings updated (active: {})", settings.is_active);
    Json(json!({
        "message": "settings updated",
        "settings": settings,
    }))
}
