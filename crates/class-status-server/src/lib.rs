//! HTTP front end for class-status.
//!
//! Serves friend free/busy status, schedule management, friend requests and
//! meetup invites over JSON. Every route except `/health` expects
//! `Authorization: Bearer <token>`.

use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use config::Config;
use state::AppState;

/// Largest schedule image accepted by `POST /schedule/upload`.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Create the application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(routes::health))
        .route(
            "/schedule",
            get(routes::list_schedule)
                .post(routes::add_block)
                .delete(routes::delete_block),
        )
        .route("/schedule/rows", post(routes::import_rows))
        .route(
            "/schedule/upload",
            post(routes::upload_schedule).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
        .route("/schedule/{user_id}", get(routes::user_schedule))
        .route("/status/{user_id}", get(routes::user_status))
        .route("/friends/status", get(routes::friends_status))
        .route("/friends/request", post(routes::send_friend_request))
        .route("/friends/requests", get(routes::pending_friend_requests))
        .route("/friends/accept", post(routes::accept_friend_request))
        .route("/friends/reject", post(routes::reject_friend_request))
        .route("/invite", post(routes::send_invite))
        .route("/notifications", get(routes::notifications))
        .route("/notifications/read", post(routes::mark_read))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Build state from `config`, bind, and serve until Ctrl+C or SIGTERM.
pub async fn start_server(config: Config) -> anyhow::Result<()> {
    info!("Initializing state...");
    let state = match &config.seed_path {
        Some(path) => AppState::from_seed_file(path)?,
        None => {
            info!("No seed file configured, starting empty");
            AppState::from_seed(&Default::default())?
        }
    };

    let app = create_router(state);

    let address = config.address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        } else {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
