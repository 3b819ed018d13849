//! Wallet session service - wallet-address login and bearer-token logout.

use std::env;
use std::sync::Arc;

use tokio::net::TcpListener;
use wallet_session_backend::{app, logging, store, AppState, Config};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle --version / -V
    if env::args().any(|a| a == "--version" || a == "-V") {
        println!("wallet-session {}", VERSION);
        return Ok(());
    }

    // Load .env file (ignore if not found)
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| {
        format!(
            "{}. Make sure config.toml exists or set WALLET_SESSION__AUTH__JWT_SECRET.",
            e
        )
    })?;

    logging::init_tracing(&config.logging.level);
    tracing::info!("Starting wallet session service {}", VERSION);

    let store = match store::open(&config.database.url) {
        Ok(store) => {
            tracing::info!(backend = store.backend(), "Identity store opened");
            store
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                url = %config.database.url,
                "Failed to open identity store"
            );
            std::process::exit(1);
        }
    };

    let state = Arc::new(AppState::new(config.clone(), store.clone()));

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown signal received, closing identity store");
    if let Err(e) = store.close().await {
        tracing::error!(error = %e, "Error during graceful shutdown");
        std::process::exit(1);
    }
    tracing::info!("Graceful shutdown completed");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
