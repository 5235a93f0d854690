//! Operator alerts for post links that match no campaign.
//!
//! Alerts go to a Telegram chat. Each link (keyed by its canonical URL when
//! recognizable) is reported at most once per cooldown window. Delivery is
//! best effort: failures are logged and never reach the caller.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use igdraw_core::{extract_post_info, AppConfig};
use serde::Serialize;
use tokio::sync::Mutex;

struct TelegramTarget {
    send_url: String,
    chat_id: String,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: String,
}

/// What [`UnknownLinkNotifier::notify_unknown`] did with an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Disabled,
    CoolingDown,
    Sent,
    Failed,
}

pub struct UnknownLinkNotifier {
    client: reqwest::Client,
    target: Option<TelegramTarget>,
    cooldown: Duration,
    last_sent: Mutex<HashMap<String, Instant>>,
}

impl UnknownLinkNotifier {
    /// Builds a notifier. Alerts are disabled unless both `bot_token` and
    /// `chat_id` are set.
    ///
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] if the HTTP client cannot be constructed.
    pub fn new(
        api_base: &str,
        bot_token: Option<&str>,
        chat_id: Option<&str>,
        cooldown: Duration,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let target = match (bot_token, chat_id) {
            (Some(token), Some(chat_id)) => Some(TelegramTarget {
                send_url: format!(
                    "{}/bot{token}/sendMessage",
                    api_base.trim_end_matches('/')
                ),
                chat_id: chat_id.to_owned(),
            }),
            _ => None,
        };
        Ok(Self {
            client,
            target,
            cooldown,
            last_sent: Mutex::new(HashMap::new()),
        })
    }

    /// # Errors
    ///
    /// Returns [`reqwest::Error`] if the HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let notifier = Self::new(
            &config.telegram_api_base,
            config.telegram_bot_token.as_deref(),
            config.telegram_chat_id.as_deref(),
            Duration::from_millis(config.unknown_notify_cooldown_ms),
            Duration::from_secs(config.feed_request_timeout_secs),
        )?;
        if !notifier.is_enabled() {
            tracing::info!("telegram credentials not set; unknown-link alerts disabled");
        }
        Ok(notifier)
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }

    /// Reports `post_url` to the operator chat unless it was reported within
    /// the cooldown window.
    pub async fn notify_unknown(&self, post_url: &str) -> NotifyOutcome {
        let Some(target) = self.target.as_ref() else {
            return NotifyOutcome::Disabled;
        };

        let key = extract_post_info(post_url)
            .map_or_else(|| post_url.to_owned(), |post| post.canonical_url);

        {
            let mut last_sent = self.last_sent.lock().await;
            if last_sent
                .get(&key)
                .is_some_and(|at| at.elapsed() < self.cooldown)
            {
                tracing::debug!(key = %key, "notify: unknown link still cooling down");
                return NotifyOutcome::CoolingDown;
            }
            // Keys come from client input; expired entries are dropped.
            last_sent.retain(|_, at| at.elapsed() < self.cooldown);
            last_sent.insert(key.clone(), Instant::now());
        }

        let body = SendMessage {
            chat_id: &target.chat_id,
            text: format!("Unknown Instagram link submitted: {post_url}"),
        };
        let result = self
            .client
            .post(&target.send_url)
            .json(&body)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);

        match result {
            Ok(_) => {
                tracing::info!(key = %key, "notify: unknown link reported");
                NotifyOutcome::Sent
            }
            Err(e) => {
                // The request URL embeds the bot token.
                tracing::error!(
                    key = %key,
                    error = %e.without_url(),
                    "notify: telegram delivery failed"
                );
                NotifyOutcome::Failed
            }
        }
    }
}
