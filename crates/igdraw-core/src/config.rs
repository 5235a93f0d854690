use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to a value that cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to a value that cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so only malformed values fail. Blank values
/// of optional variables count as unset.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("IGDRAW_ENV", "development"))?;

    let bind_addr = parse_addr("IGDRAW_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("IGDRAW_LOG_LEVEL", "info");

    let sheet_id = optional("IGDRAW_SHEET_ID");
    let sheet_gid = or_default("IGDRAW_SHEET_GID", "0");
    let sheets_base_url = or_default("IGDRAW_SHEETS_BASE_URL", "https://docs.google.com");
    let sheet_refresh_ms = parse_u64("IGDRAW_SHEET_REFRESH_MS", "5000")?;
    if sheet_refresh_ms == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "IGDRAW_SHEET_REFRESH_MS".to_string(),
            reason: "refresh interval must be greater than zero".to_string(),
        });
    }
    let fallback_path = PathBuf::from(or_default("IGDRAW_FALLBACK_PATH", "./campaigns.json"));

    let feed_request_timeout_secs = parse_u64("IGDRAW_FEED_REQUEST_TIMEOUT_SECS", "15")?;
    let feed_user_agent = or_default("IGDRAW_FEED_USER_AGENT", "igdraw/0.1 (campaign-sync)");
    let feed_max_retries = parse_u32("IGDRAW_FEED_MAX_RETRIES", "1")?;
    let feed_retry_backoff_base_secs = parse_u64("IGDRAW_FEED_RETRY_BACKOFF_BASE_SECS", "1")?;

    let telegram_bot_token = optional("IGDRAW_TELEGRAM_BOT_TOKEN");
    let telegram_chat_id = optional("IGDRAW_TELEGRAM_CHAT_ID");
    let telegram_api_base = or_default("IGDRAW_TELEGRAM_API_BASE", "https://api.telegram.org");
    let unknown_notify_cooldown_ms = parse_u64("IGDRAW_UNKNOWN_NOTIFY_COOLDOWN_MS", "60000")?;

    let debug_token = optional("IGDRAW_DEBUG_TOKEN");

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        sheet_id,
        sheet_gid,
        sheets_base_url,
        sheet_refresh_ms,
        fallback_path,
        feed_request_timeout_secs,
        feed_user_agent,
        feed_max_retries,
        feed_retry_backoff_base_secs,
        telegram_bot_token,
        telegram_chat_id,
        telegram_api_base,
        unknown_notify_cooldown_ms,
        debug_token,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "IGDRAW_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
