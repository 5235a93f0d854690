use axum::{body::Bytes, extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use igdraw_core::Campaign;
use igdraw_store::{Draw, DrawError, PickedWinner};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, AppState, ResponseMeta};

const MISSING_URL_MESSAGE: &str = "Post URL is required";
const UNKNOWN_POST_MESSAGE: &str = "We could not reach this post. Please try another link.";
const NO_WINNERS_MESSAGE: &str = "No eligible commenters detected for this post.";
const EMPTY_COMMENT_TEXT: &str = "No caption provided";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ScrapeRequest {
    #[serde(default)]
    post_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CampaignStats {
    total_comments: u64,
    unique_users: usize,
    eligible_users: usize,
    entries: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CommentItem {
    username: String,
    text: String,
    profile_url: String,
    order: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RecentItem {
    username: String,
    comment: String,
    order: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ScrapeResponse {
    success: bool,
    stats: CampaignStats,
    comments: Vec<CommentItem>,
    recent: Vec<RecentItem>,
    winner: PickedWinner,
    preview_url: String,
    canonical_url: String,
    synced_at: Option<DateTime<Utc>>,
    meta: ResponseMeta,
}

impl CampaignStats {
    fn from_campaign(campaign: &Campaign) -> Self {
        let entries = campaign.winners.len();
        Self {
            total_comments: campaign.comments_count,
            unique_users: entries,
            eligible_users: entries,
            entries,
        }
    }
}

fn comment_items(campaign: &Campaign) -> Vec<CommentItem> {
    campaign
        .winners
        .iter()
        .enumerate()
        .map(|(idx, winner)| CommentItem {
            username: winner.username.clone(),
            text: if winner.comment.is_empty() {
                EMPTY_COMMENT_TEXT.to_owned()
            } else {
                winner.comment.clone()
            },
            profile_url: winner.profile_url.clone(),
            order: idx + 1,
        })
        .collect()
}

fn recent_items(campaign: &Campaign) -> Vec<RecentItem> {
    campaign
        .recent
        .iter()
        .enumerate()
        .map(|(idx, entry)| RecentItem {
            username: entry.username.clone(),
            comment: entry.comment.clone(),
            order: idx + 1,
        })
        .collect()
}

impl ScrapeResponse {
    fn from_draw(draw: Draw, meta: ResponseMeta) -> Self {
        let Draw {
            campaign,
            winner,
            meta: sync_meta,
        } = draw;
        Self {
            success: true,
            stats: CampaignStats::from_campaign(&campaign),
            comments: comment_items(&campaign),
            recent: recent_items(&campaign),
            winner,
            preview_url: campaign.embed_url.clone(),
            canonical_url: campaign.canonical_url.clone(),
            synced_at: sync_meta.last_sync,
            meta,
        }
    }
}

/// `POST /api/scrape/comments`: draws the next winner for a post link.
///
/// The body is parsed by hand so malformed JSON gets the same 400 envelope as
/// a missing `postUrl`.
pub(super) async fn scrape_comments(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let bad_request = || ApiError::new(req_id.0.clone(), "bad_request", MISSING_URL_MESSAGE);

    let request: ScrapeRequest = serde_json::from_slice(&body).map_err(|_| bad_request())?;
    let post_url = request
        .post_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(bad_request)?;

    match state.store.draw(post_url).await {
        Ok(draw) => {
            tracing::info!(
                shortcode = %draw.campaign.shortcode,
                order = draw.winner.order,
                "scrape: winner drawn"
            );
            Ok(Json(ScrapeResponse::from_draw(
                draw,
                ResponseMeta::new(req_id.0),
            )))
        }
        Err(DrawError::UnknownPost { .. }) => {
            tracing::info!(post_url, "scrape: unknown post link");
            state.notifier.notify_unknown(post_url).await;
            Err(ApiError::new(req_id.0, "not_found", UNKNOWN_POST_MESSAGE))
        }
        Err(DrawError::NoEligibleWinners { shortcode }) => {
            tracing::warn!(shortcode = %shortcode, "scrape: campaign has no eligible winners");
            Err(ApiError::new(req_id.0, "no_eligible_winners", NO_WINNERS_MESSAGE))
        }
    }
}
