use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use igdraw_core::{extract_post_info, Campaign};
use tokio::sync::{Mutex, RwLock};

use crate::error::DrawError;
use crate::meta::{SyncMeta, SyncSource};
use crate::rotation::{PickedWinner, RotationEngine};

/// Immutable shortcode → campaign map. Replaced wholesale, never mutated.
pub type CampaignMap = HashMap<String, Arc<Campaign>>;

#[derive(Debug, Default)]
struct StoreState {
    campaigns: Arc<CampaignMap>,
    meta: SyncMeta,
}

/// Result of a successful draw.
#[derive(Debug, Clone)]
pub struct Draw {
    pub campaign: Arc<Campaign>,
    pub winner: PickedWinner,
    pub meta: SyncMeta,
}

/// Point-in-time view of the store for health and debug endpoints.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub campaigns: Arc<CampaignMap>,
    pub meta: SyncMeta,
    pub rotation_count: usize,
}

/// The authoritative campaign set plus per-campaign rotation.
///
/// Lock order is rotation first, then state. Both `draw` and `replace`
/// follow it, so a draw never observes a half-applied replace and cannot
/// recreate rotation state for a shortcode that a replace just removed.
#[derive(Debug)]
pub struct CampaignStore {
    state: RwLock<StoreState>,
    rotation: Mutex<RotationEngine>,
}

impl Default for CampaignStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CampaignStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_rotation(RotationEngine::new())
    }

    #[must_use]
    pub fn with_rotation(rotation: RotationEngine) -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            rotation: Mutex::new(rotation),
        }
    }

    /// Atomically replaces the campaign set.
    ///
    /// Returns `false` and leaves everything untouched when `list` holds no
    /// valid campaign. Later duplicates of a shortcode win.
    pub async fn replace(&self, list: Vec<Campaign>, source: SyncSource) -> bool {
        if !list.iter().any(Campaign::is_valid) {
            tracing::debug!(
                rows = list.len(),
                %source,
                "store: replace ignored, no valid campaigns"
            );
            return false;
        }

        let row_count = list.len();
        let total_comments = list
            .iter()
            .fold(0u64, |acc, c| acc.saturating_add(c.comments_count));
        let sample: Vec<String> = list
            .iter()
            .take(3)
            .map(|c| c.canonical_url.clone())
            .collect();

        let mut map = CampaignMap::with_capacity(list.len());
        let mut shortcodes = Vec::new();
        for campaign in list.into_iter().filter(Campaign::is_valid) {
            if !map.contains_key(&campaign.shortcode) {
                shortcodes.push(campaign.shortcode.clone());
            }
            map.insert(campaign.shortcode.clone(), Arc::new(campaign));
        }

        let mut rotation = self.rotation.lock().await;
        let mut state = self.state.write().await;

        for campaign in map.values() {
            rotation.ensure_rotation(&campaign.shortcode, &campaign.winners);
        }
        rotation.retain(|code| map.contains_key(code));

        let stored = map.len();
        state.campaigns = Arc::new(map);
        state.meta = SyncMeta {
            last_sync: Some(Utc::now()),
            last_error: None,
            source,
            row_count,
            shortcodes,
            last_duration_ms: state.meta.last_duration_ms,
            total_comments,
            sample,
        };

        tracing::info!(
            %source,
            rows = row_count,
            campaigns = stored,
            rotations = rotation.len(),
            "store: campaigns replaced"
        );
        true
    }

    /// Finds the campaign for any recognizable form of a post link.
    pub async fn lookup(&self, post_url: &str) -> Option<Arc<Campaign>> {
        let post = extract_post_info(post_url)?;
        let state = self.state.read().await;
        state.campaigns.get(&post.shortcode).cloned()
    }

    /// Looks up the campaign for `post_url` and draws its next winner.
    ///
    /// # Errors
    ///
    /// - [`DrawError::UnknownPost`] if the link is unrecognized or no
    ///   campaign is stored for it.
    /// - [`DrawError::NoEligibleWinners`] if the campaign has no winners.
    pub async fn draw(&self, post_url: &str) -> Result<Draw, DrawError> {
        let unknown = || DrawError::UnknownPost {
            post_url: post_url.to_owned(),
        };
        let post = extract_post_info(post_url).ok_or_else(unknown)?;

        let mut rotation = self.rotation.lock().await;
        let (campaign, meta) = {
            let state = self.state.read().await;
            (
                state.campaigns.get(&post.shortcode).cloned(),
                state.meta.clone(),
            )
        };
        let campaign = campaign.ok_or_else(unknown)?;

        let winner = rotation
            .pick_winner(&campaign)
            .ok_or_else(|| DrawError::NoEligibleWinners {
                shortcode: campaign.shortcode.clone(),
            })?;

        Ok(Draw {
            campaign,
            winner,
            meta,
        })
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        let rotation = self.rotation.lock().await;
        let state = self.state.read().await;
        StoreSnapshot {
            campaigns: Arc::clone(&state.campaigns),
            meta: state.meta.clone(),
            rotation_count: rotation.len(),
        }
    }

    pub async fn meta(&self) -> SyncMeta {
        self.state.read().await.meta.clone()
    }

    /// Records a failed sync without touching the served campaigns.
    pub async fn record_sync_error(&self, message: impl Into<String>) {
        self.state.write().await.meta.last_error = Some(message.into());
    }

    pub async fn record_sync_duration(&self, duration: Duration) {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.state.write().await.meta.last_duration_ms = Some(millis);
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.campaigns.is_empty()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.campaigns.len()
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
