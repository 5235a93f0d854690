//! Row-to-campaign ingestion.
//!
//! Rows that cannot become a valid [`Campaign`] are expected, not errors:
//! operators leave half-filled rows, paste profile links instead of post
//! links, or clear the winners cell mid-campaign. Such rows are reported as
//! [`RowOutcome::Skipped`] and filtered out by the batch functions.
//!
//! Duplicate shortcodes are kept here; the store resolves them on replace.

use std::fmt;

use igdraw_core::{extract_post_info, Campaign, Winner};

use crate::parse::{parse_number, parse_recent_entries, parse_winners};
use crate::types::{CampaignRecord, LegacyCampaign, SheetRow};

/// Why a row did not produce a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingUrl,
    NotInstagram,
    UnrecognizedPost,
    NoWinners,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingUrl => write!(f, "missing post url"),
            SkipReason::NotInstagram => write!(f, "not an instagram link"),
            SkipReason::UnrecognizedPost => write!(f, "unrecognized post link"),
            SkipReason::NoWinners => write!(f, "no winners"),
        }
    }
}

/// Result of ingesting a single row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Parsed(Campaign),
    Skipped(SkipReason),
}

/// Converts one positional record into a campaign.
#[must_use]
pub fn ingest_record(record: &CampaignRecord) -> RowOutcome {
    let Some(raw_url) = record
        .post_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
    else {
        return RowOutcome::Skipped(SkipReason::MissingUrl);
    };
    if !raw_url.contains("instagram.com") {
        return RowOutcome::Skipped(SkipReason::NotInstagram);
    }
    let Some(post) = extract_post_info(raw_url) else {
        return RowOutcome::Skipped(SkipReason::UnrecognizedPost);
    };

    let winners = parse_winners(&record.winners);
    if winners.is_empty() {
        return RowOutcome::Skipped(SkipReason::NoWinners);
    }

    let comments_count = record.comments_count.as_deref().map_or(0, parse_number);
    let recent = parse_recent_entries(&record.recent);

    RowOutcome::Parsed(Campaign::from_post(post, winners, recent, comments_count))
}

/// Ingests records in order, dropping rows that do not form a campaign.
pub fn ingest_records<'a, I>(records: I) -> Vec<Campaign>
where
    I: IntoIterator<Item = &'a CampaignRecord>,
{
    let mut campaigns = Vec::new();
    let mut skipped = 0usize;

    for (row, record) in records.into_iter().enumerate() {
        match ingest_record(record) {
            RowOutcome::Parsed(campaign) => campaigns.push(campaign),
            RowOutcome::Skipped(reason) => {
                skipped += 1;
                tracing::debug!(row, %reason, "ingest: skipping row");
            }
        }
    }

    if skipped > 0 {
        tracing::debug!(
            parsed = campaigns.len(),
            skipped,
            "ingest: finished pass with skipped rows"
        );
    }

    campaigns
}

/// Ingests raw spreadsheet rows.
#[must_use]
pub fn ingest_sheet_rows(rows: &[SheetRow]) -> Vec<Campaign> {
    let records: Vec<CampaignRecord> = rows.iter().map(SheetRow::to_record).collect();
    ingest_records(&records)
}

/// Adapts campaigns from the fallback file into the canonical shape.
///
/// Accounts without a username are dropped. Entries with an unrecognized
/// `postUrl` or no remaining accounts are skipped.
#[must_use]
pub fn convert_legacy(entries: &[LegacyCampaign]) -> Vec<Campaign> {
    entries
        .iter()
        .filter_map(|entry| {
            let post = extract_post_info(entry.post_url.as_deref().unwrap_or_default())?;
            let winners: Vec<Winner> = entry
                .accounts
                .iter()
                .filter_map(|account| {
                    let username = account.username.as_deref().map(str::trim)?;
                    if username.is_empty() {
                        return None;
                    }
                    Some(Winner {
                        username: username.to_owned(),
                        profile_url: account.profile_url.clone().unwrap_or_default(),
                        comment: account.comment.clone().unwrap_or_default(),
                    })
                })
                .collect();
            if winners.is_empty() {
                tracing::debug!(shortcode = %post.shortcode, "fallback: entry has no accounts");
                return None;
            }
            let recent = parse_recent_entries(&entry.recent_text());
            let comments_count = entry
                .stats
                .as_ref()
                .and_then(|s| s.total_comments)
                .unwrap_or(0);
            Some(Campaign::from_post(post, winners, recent, comments_count))
        })
        .collect()
}
