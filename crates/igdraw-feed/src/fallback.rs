use std::io::ErrorKind;
use std::path::Path;

use crate::error::FeedError;
use crate::types::LegacyCampaign;

/// Reads the static fallback campaign file.
///
/// A missing file is not an error and yields no campaigns.
///
/// # Errors
///
/// - [`FeedError::Io`] if the file exists but cannot be read.
/// - [`FeedError::Deserialize`] if the content is not a JSON array of
///   campaign objects.
pub async fn load_fallback_campaigns(path: &Path) -> Result<Vec<LegacyCampaign>, FeedError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "fallback file not found");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(FeedError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&content).map_err(|source| FeedError::Deserialize {
        context: format!("fallback file {}", path.display()),
        source,
    })
}
