//! civicpulse server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use civicpulse_api::{AppState, app};
use civicpulse_common::{Config, logging};
use civicpulse_core::{ProfileService, ReportService, TimelineGenerator, UpvoteService};
use civicpulse_db::repositories::{
    ProfileRepository, ReportRepository, TimelineRepository, UpvoteRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load()?;
    logging::init(&config.logging)?;

    info!("Starting civicpulse server...");

    // Connect to database
    let db = civicpulse_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    civicpulse_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let profile_repo = ProfileRepository::new(Arc::clone(&db));
    let report_repo = ReportRepository::new(Arc::clone(&db));
    let timeline_repo = TimelineRepository::new(Arc::clone(&db));
    let upvote_repo = UpvoteRepository::new(Arc::clone(&db));

    // Initialize services
    let profile_service = ProfileService::new(profile_repo.clone());
    let mut report_service = ReportService::new(
        report_repo.clone(),
        timeline_repo,
        upvote_repo.clone(),
        profile_repo,
    );
    if let Some(seed) = config.timeline.seed {
        info!(seed, "Using seeded timeline generator");
    }
    report_service
        .set_timeline_generator(TimelineGenerator::from_seed_option(config.timeline.seed));
    let upvote_service = UpvoteService::new(report_repo, upvote_repo);

    let state = AppState {
        profile_service,
        report_service,
        upvote_service,
        api_key: config.server.api_key.clone(),
    };

    let app = app(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}
