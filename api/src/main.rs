//! Group Directory Service
//!
//! Looks up academic groups by name or identifier, lists them by department
//! and faculty, and registers new groups in batches.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::sync::watch;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod config;
mod domain;
mod entity;
mod error;
mod handlers;

#[cfg(test)]
mod test_utils;

#[cfg(test)]
mod integration_tests;

use adapters::PostgresGroupRepository;
use app::{CancelSignal, GroupService};
use config::{Config, RateLimit};
use domain::ports::GroupRepository;

/// Application state shared across all handlers
pub struct AppState<GR>
where
    GR: GroupRepository,
{
    pub group_service: Arc<GroupService<GR>>,
    /// Fires when the process starts shutting down
    pub cancel: CancelSignal,
}

impl<GR> Clone for AppState<GR>
where
    GR: GroupRepository,
{
    fn clone(&self) -> Self {
        Self {
            group_service: self.group_service.clone(),
            cancel: self.cancel.clone(),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the router, rate limiting AddGroups when a limit is given
pub fn build_router<GR>(
    state: AppState<GR>,
    add_groups_rate_limit: Option<RateLimit>,
) -> anyhow::Result<Router>
where
    GR: GroupRepository + 'static,
{
    let mut batch_routes =
        Router::new().route("/GroupService/AddGroups", post(handlers::add_groups::<GR>));

    if let Some(limit) = add_groups_rate_limit {
        // Uses PeerIpKeyExtractor, so the server must expose connect info
        let governor_config = Arc::new(
            GovernorConfigBuilder::default()
                .key_extractor(PeerIpKeyExtractor)
                .per_second(limit.per_second)
                .burst_size(limit.burst)
                .finish()
                .ok_or_else(|| anyhow::anyhow!("invalid AddGroups rate limit: {:?}", limit))?,
        );
        batch_routes = batch_routes.layer(GovernorLayer {
            config: governor_config,
        });
    }

    let app = Router::new()
        .route("/health", get(health))
        .route("/GroupService/GetGroup", post(handlers::get_group::<GR>))
        .route(
            "/GroupService/GetGroupList",
            post(handlers::get_group_list::<GR>),
        )
        .merge(batch_routes)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                tracing::warn!("Failed to register signal handlers, falling back to Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,group_service_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting group service...");

    // Load configuration
    let config = Config::from_env()?;

    // Connect to PostgreSQL
    tracing::info!("Connecting to database...");
    let repo = Arc::new(PostgresGroupRepository::connect(&config.database_url).await?);
    tracing::info!("Database connected");

    if config.auto_migrate {
        repo.ensure_schema().await?;
        tracing::info!("Schema ensured");
    }

    // Flipped once on SIGTERM/SIGINT, observed by the server and by running batches
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let state = AppState {
        group_service: Arc::new(GroupService::new(repo.clone())),
        cancel: CancelSignal::new(shutdown_rx.clone()),
    };
    let app = build_router(state, config.add_groups_rate_limit)?;

    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let _ = shutdown_rx.wait_for(|stop| *stop).await;
    })
    .await?;

    repo.close().await?;
    tracing::info!("Database connection closed");

    Ok(())
}
