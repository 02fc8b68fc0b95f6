//! HTTP server setup and shared state.

use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderValue,
    response::Json,
    routing::get,
    Router,
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::notify::notifier_from_config;
use crate::reminder::{DisplayZone, ReminderScheduler};
use crate::store::{create_todo_store, TodoStore};

use super::todos;
use super::types::HealthResponse;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Todo storage backend
    pub store: Arc<dyn TodoStore>,
    /// Background reminder scheduler (None when disabled)
    pub scheduler: Option<Arc<ReminderScheduler>>,
}

/// Build the application router (without binding a socket).
pub fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let cors = cors_layer(state.config.cors_origin.as_deref())?;

    Ok(Router::new()
        .route("/api/health", get(health))
        .merge(todos::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Permissive unless a single origin is configured; the browser client sends credentials.
fn cors_layer(origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    match origin {
        None => Ok(CorsLayer::permissive()),
        Some(origin) => {
            let origin: HeaderValue = origin
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid CORS_ORIGIN {:?}: {}", origin, e))?;
            Ok(CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true))
        }
    }
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store: Arc<dyn TodoStore> =
        Arc::from(create_todo_store(config.store, config.data_dir.clone()).await?);
    tracing::info!(
        "Todo store initialized: {} (persistent: {})",
        config.store.as_str(),
        store.is_persistent()
    );

    let cancel = CancellationToken::new();

    let scheduler = if config.reminders.enabled {
        let notifier = notifier_from_config(&config.reminders)?;
        let zone = DisplayZone::from_offset(config.reminders.utc_offset);
        Some(Arc::new(ReminderScheduler::new(
            Arc::clone(&store),
            notifier,
            zone,
        )))
    } else {
        tracing::info!("Reminder scheduler disabled (REMINDERS_ENABLED=false)");
        None
    };
    let scheduler_handle = scheduler
        .as_ref()
        .map(|s| Arc::clone(s).spawn(cancel.clone()));

    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        scheduler,
    });
    let app = router(state)?;

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    // Setup graceful shutdown on SIGTERM/SIGINT
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel.cancel();
    if let Some(handle) = scheduler_handle {
        if let Err(e) = handle.await {
            tracing::warn!("Reminder scheduler ended abnormally: {}", e);
        }
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for SIGINT/SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping reminder scheduler...");
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: state.config.store.as_str().to_string(),
        persistent: state.store.is_persistent(),
        reminders: state.scheduler.is_some(),
    })
}
