use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tryon_gemini::config::GeminiConfig;
use tryon_gemini::generator::GeminiGenerator;

use tryon_api::background::session_expiry;
use tryon_api::config::ServerConfig;
use tryon_api::router::build_app_router;
use tryon_api::sessions::SessionStore;
use tryon_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "tryon_api=debug,tryon_gemini=debug,tryon_core=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let gemini_config = GeminiConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Gemini configuration is invalid");
        std::process::exit(1);
    });
    tracing::info!(model = %gemini_config.model, "Loaded Gemini configuration");

    // --- Image generator ---
    let generator = GeminiGenerator::new(gemini_config).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build Gemini client");
        std::process::exit(1);
    });

    // --- Sessions ---
    let sessions = Arc::new(SessionStore::new());

    let expiry_cancel = CancellationToken::new();
    let expiry_handle = tokio::spawn(session_expiry::run(
        Arc::clone(&sessions),
        Duration::from_secs(config.session_idle_timeout_secs),
        session_expiry::SWEEP_INTERVAL,
        expiry_cancel.clone(),
    ));

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        generator: Arc::new(generator),
        sessions: Arc::clone(&sessions),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    expiry_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), expiry_handle).await;
    tracing::info!("Session expiry job stopped");

    let session_count = sessions.count().await;
    sessions.clear().await;
    tracing::info!(session_count, "Dropped remaining sessions and spooled uploads");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
