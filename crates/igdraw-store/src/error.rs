use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DrawError {
    #[error("no campaign is configured for {post_url}")]
    UnknownPost { post_url: String },

    #[error("campaign {shortcode} has no eligible winners")]
    NoEligibleWinners { shortcode: String },
}
