mod debug;
mod scrape;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use igdraw_store::{CampaignStore, SyncMeta};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, require_debug_token, DebugTokenState};
use crate::notify::UnknownLinkNotifier;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CampaignStore>,
    pub notifier: Arc<UnknownLinkNotifier>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

/// Error body shared by every endpoint: `{success: false, error, code, meta}`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    success: bool,
    pub error: String,
    pub code: String,
    pub meta: ResponseMeta,
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            error: message.into(),
            code: code.into(),
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "forbidden" => StatusCode::FORBIDDEN,
            "bad_request" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthData {
    status: &'static str,
    campaigns: usize,
    rotation_state: usize,
    meta: SyncMeta,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RootData {
    status: &'static str,
    message: &'static str,
    campaigns: usize,
    last_sync: Option<DateTime<Utc>>,
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

fn debug_router(debug: DebugTokenState) -> Router<AppState> {
    Router::new()
        .route("/debug/campaigns", get(debug::list_campaigns))
        .layer(axum::middleware::from_fn_with_state(
            debug,
            require_debug_token,
        ))
}

pub fn build_app(state: AppState, debug: DebugTokenState) -> Router {
    let public_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/scrape/comments", post(scrape::scrape_comments));

    Router::new()
        .merge(public_routes)
        .merge(debug_router(debug))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.store.snapshot().await;
    Json(HealthData {
        status: "ok",
        campaigns: snapshot.campaigns.len(),
        rotation_state: snapshot.rotation_count,
        meta: snapshot.meta,
    })
}

async fn root(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.store.snapshot().await;
    Json(RootData {
        status: "ok",
        message: "Instagram picker API is running",
        campaigns: snapshot.campaigns.len(),
        last_sync: snapshot.meta.last_sync,
    })
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
