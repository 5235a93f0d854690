pub mod app_config;
pub mod campaign;
pub mod config;
pub mod post;

pub use app_config::{AppConfig, Environment};
pub use campaign::{Campaign, RecentEntry, Winner};
pub use config::{load_app_config, load_app_config_from_env};
pub use post::{extract_post_info, to_absolute_url, PostReference, PostType};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
