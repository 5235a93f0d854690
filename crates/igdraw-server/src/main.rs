mod api;
mod middleware;
mod notify;
mod scheduler;
mod sync;

use std::sync::Arc;
use std::time::Duration;

use igdraw_core::AppConfig;
use igdraw_feed::SheetClient;
use igdraw_store::CampaignStore;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::DebugTokenState,
    notify::UnknownLinkNotifier,
    sync::SyncController,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(igdraw_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::info!(env = %config.env, "starting igdraw-server");

    let store = Arc::new(CampaignStore::new());
    let feed = build_feed(&config)?;
    let controller = Arc::new(SyncController::new(
        Arc::clone(&store),
        feed,
        config.fallback_path.clone(),
    ));

    let _scheduler = if controller.has_feed() {
        Some(
            scheduler::start_sheet_sync(
                Arc::clone(&controller),
                Duration::from_millis(config.sheet_refresh_ms),
            )
            .await?,
        )
    } else {
        tracing::warn!("IGDRAW_SHEET_ID is not configured; serving fallback campaigns only");
        controller.apply_fallback().await;
        None
    };

    let notifier = Arc::new(UnknownLinkNotifier::from_config(&config)?);
    let debug = DebugTokenState::new(config.debug_token.as_deref());
    let app = build_app(AppState { store, notifier }, debug);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// The sheet feed, when a sheet is configured.
fn build_feed(config: &AppConfig) -> anyhow::Result<Option<SheetClient>> {
    let Some(sheet_id) = config.sheet_id.as_deref() else {
        return Ok(None);
    };
    let client = SheetClient::new(
        &config.sheets_base_url,
        sheet_id,
        &config.sheet_gid,
        config.feed_request_timeout_secs,
        &config.feed_user_agent,
        config.feed_max_retries,
        config.feed_retry_backoff_base_secs,
    )?;
    tracing::info!(
        gid = %config.sheet_gid,
        refresh_ms = config.sheet_refresh_ms,
        "sheet sync enabled"
    );
    Ok(Some(client))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
