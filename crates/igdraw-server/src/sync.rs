//! Periodic campaign synchronization.
//!
//! The feed is authoritative whenever it returns at least one valid row.
//! Fetch failures and sheets without a valid row are recorded in the store's
//! sync metadata; the fallback file is loaded only when nothing is being
//! served yet.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use igdraw_core::Campaign;
use igdraw_feed::{convert_legacy, ingest_sheet_rows, load_fallback_campaigns, CampaignFeed};
use igdraw_store::{CampaignStore, SyncSource};

/// Result of one sync attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No feed is configured.
    Disabled,
    /// Campaigns from the feed replaced the stored set.
    Applied { campaigns: usize },
    /// The feed answered but produced no valid campaign. Handled like a
    /// failure: the store keeps its data, or gets the fallback if empty.
    Empty,
    /// The feed failed; see `lastError` in the sync metadata.
    Failed,
    /// Another sync was still running.
    Skipped,
}

/// Resets the in-flight flag when a tick ends, including on panic.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

const NO_VALID_CAMPAIGNS: &str = "sheet produced no valid campaigns";

pub struct SyncController<F> {
    store: Arc<CampaignStore>,
    feed: Option<F>,
    fallback_path: PathBuf,
    in_flight: AtomicBool,
}

impl<F: CampaignFeed> SyncController<F> {
    pub fn new(store: Arc<CampaignStore>, feed: Option<F>, fallback_path: PathBuf) -> Self {
        Self {
            store,
            feed,
            fallback_path,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn has_feed(&self) -> bool {
        self.feed.is_some()
    }

    /// Runs one sync unless a previous one is still in flight.
    pub async fn tick(&self) -> SyncOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("sync: previous run still in flight, skipping tick");
            return SyncOutcome::Skipped;
        }
        let _guard = InFlightGuard(&self.in_flight);
        self.sync_once().await
    }

    pub async fn sync_once(&self) -> SyncOutcome {
        let Some(feed) = self.feed.as_ref() else {
            return SyncOutcome::Disabled;
        };

        let started = Instant::now();
        let outcome = match feed.fetch_rows().await {
            Ok(rows) => {
                let campaigns = ingest_sheet_rows(&rows);
                let count = campaigns.len();
                if count > 0 && self.store.replace(campaigns, SyncSource::Sheet).await {
                    SyncOutcome::Applied { campaigns: count }
                } else {
                    tracing::warn!(rows = rows.len(), "sync: sheet produced no valid campaigns");
                    self.record_failure(NO_VALID_CAMPAIGNS).await;
                    SyncOutcome::Empty
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "sync: sheet sync failed");
                self.record_failure(&e.to_string()).await;
                SyncOutcome::Failed
            }
        };
        self.store.record_sync_duration(started.elapsed()).await;
        outcome
    }

    /// Falls back to the static file when nothing is served yet, then records
    /// `message` as the last sync error.
    async fn record_failure(&self, message: &str) {
        if self.store.is_empty().await {
            self.apply_fallback().await;
        }
        self.store.record_sync_error(message).await;
    }

    /// Reads and converts the fallback file. Read or parse problems are
    /// logged and yield no campaigns.
    pub async fn load_fallback(&self) -> Vec<Campaign> {
        match load_fallback_campaigns(&self.fallback_path).await {
            Ok(entries) => convert_legacy(&entries),
            Err(e) => {
                tracing::warn!(
                    path = %self.fallback_path.display(),
                    error = %e,
                    "sync: fallback campaigns unavailable"
                );
                Vec::new()
            }
        }
    }

    /// Loads the fallback file into the store. Returns whether anything was
    /// applied.
    pub async fn apply_fallback(&self) -> bool {
        let campaigns = self.load_fallback().await;
        if campaigns.is_empty() {
            tracing::warn!(
                path = %self.fallback_path.display(),
                "sync: no fallback campaigns to serve"
            );
            return false;
        }
        self.store.replace(campaigns, SyncSource::Fallback).await
    }
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
