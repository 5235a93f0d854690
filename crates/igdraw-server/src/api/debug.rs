use axum::{extract::State, Json};
use igdraw_store::SyncMeta;
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
pub(super) struct DebugCampaigns {
    campaigns: usize,
    shortcodes: Vec<String>,
    meta: SyncMeta,
}

/// `GET /debug/campaigns`: stored shortcodes in sheet order plus sync metadata.
pub(super) async fn list_campaigns(State(state): State<AppState>) -> Json<DebugCampaigns> {
    let snapshot = state.store.snapshot().await;
    Json(DebugCampaigns {
        campaigns: snapshot.campaigns.len(),
        shortcodes: snapshot.meta.shortcodes.clone(),
        meta: snapshot.meta,
    })
}
