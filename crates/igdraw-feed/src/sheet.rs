use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::error::FeedError;
use crate::retry::retry_with_backoff;
use crate::types::{GvizResponse, SheetRow};

/// A source of raw campaign rows.
///
/// The sync controller only depends on this trait, so tests can drive it with
/// an in-memory feed instead of a live spreadsheet.
pub trait CampaignFeed: Send + Sync {
    /// Fetches every row of the campaign table, header excluded.
    fn fetch_rows(&self) -> impl Future<Output = Result<Vec<SheetRow>, FeedError>> + Send;
}

/// HTTP client for a publicly shared Google Sheet, read through the gviz
/// query endpoint.
///
/// Transient errors (429, network failures) are retried with exponential
/// backoff up to `max_retries` additional attempts.
pub struct SheetClient {
    client: Client,
    export_url: String,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl SheetClient {
    /// Creates a `SheetClient` for one sheet tab.
    ///
    /// `base_url` is the spreadsheet host (`https://docs.google.com` in
    /// production, a mock server in tests).
    ///
    /// # Errors
    ///
    /// - [`FeedError::InvalidSheetUrl`] if `base_url` is not an absolute URL
    ///   or `sheet_id` is blank.
    /// - [`FeedError::Http`] if the underlying `reqwest::Client` cannot be
    ///   constructed.
    pub fn new(
        base_url: &str,
        sheet_id: &str,
        gid: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, FeedError> {
        let export_url = build_export_url(base_url, sheet_id, gid)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            export_url,
            max_retries,
            backoff_base_secs,
        })
    }

    /// The gviz JSON endpoint this client polls.
    #[must_use]
    pub fn export_url(&self) -> &str {
        &self.export_url
    }

    async fn fetch_once(&self) -> Result<Vec<SheetRow>, FeedError> {
        let url = self.export_url.as_str();
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(FeedError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            return Err(FeedError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response.text().await?;
        parse_gviz_payload(&body)
    }
}

impl CampaignFeed for SheetClient {
    async fn fetch_rows(&self) -> Result<Vec<SheetRow>, FeedError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            self.fetch_once()
        })
        .await
    }
}

fn build_export_url(base_url: &str, sheet_id: &str, gid: &str) -> Result<String, FeedError> {
    let sheet_id = sheet_id.trim();
    if sheet_id.is_empty() {
        return Err(FeedError::InvalidSheetUrl {
            url: base_url.to_owned(),
            reason: "sheet id is empty".to_owned(),
        });
    }

    let base = base_url.trim().trim_end_matches('/');
    let mut url = Url::parse(&format!("{base}/spreadsheets/d/{sheet_id}/gviz/tq")).map_err(
        |e| FeedError::InvalidSheetUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        },
    )?;
    url.query_pairs_mut()
        .append_pair("tqx", "out:json")
        .append_pair("gid", gid.trim());
    Ok(url.to_string())
}

/// Strips the `google.visualization.Query.setResponse(...)` wrapper.
/// Bare JSON is returned unchanged.
fn unwrap_jsonp(text: &str) -> &str {
    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        return trimmed;
    }
    match (trimmed.find('('), trimmed.rfind(')')) {
        (Some(start), Some(end)) if start < end => &trimmed[start + 1..end],
        _ => trimmed,
    }
}

/// Decodes a gviz response body into its table rows.
pub(crate) fn parse_gviz_payload(text: &str) -> Result<Vec<SheetRow>, FeedError> {
    let payload: GvizResponse =
        serde_json::from_str(unwrap_jsonp(text)).map_err(|e| FeedError::Deserialize {
            context: "gviz sheet response".to_owned(),
            source: e,
        })?;

    if payload.status.as_deref() == Some("error") {
        let message = payload
            .errors
            .first()
            .map_or_else(|| "unknown error".to_owned(), |e| e.describe());
        return Err(FeedError::Sheet(message));
    }

    Ok(payload.table.map(|t| t.rows).unwrap_or_default())
}

#[cfg(test)]
#[path = "sheet_test.rs"]
mod tests;
