//! AppDeck - curated app-link portal for school zones

use appdeck::api::{self, AppState};
use appdeck::catalog::Catalog;
use appdeck::config::Config;
use appdeck::storage::{FilesystemBlobStore, FilesystemStore};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// AppDeck - curated app links for students and teachers
#[derive(Parser, Debug)]
#[command(name = "appdeck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Listen address (overrides config)
    #[arg(short, long, value_name = "ADDR")]
    listen: Option<String>,

    /// Data directory (overrides config)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose {
        "appdeck=trace,tower_http=trace"
    } else {
        "appdeck=debug,tower_http=debug"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from file if specified, otherwise use default loading
    let mut config = if let Some(ref path) = cli.config {
        Config::from_file(path)?
    } else {
        Config::load()
    };

    // CLI overrides
    if let Some(ref addr) = cli.listen {
        config.listen_addr = addr.parse()?;
    }
    if let Some(ref dir) = cli.data_dir {
        config.data_dir = dir.into();
    }

    info!("Starting AppDeck portal server");
    info!("  Listen address: {}", config.listen_addr);
    info!("  Data directory: {:?}", config.data_dir);
    if config.admin_secret.is_none() {
        warn!("  Admin secret NOT configured — admin login will fail until APPDECK_ADMIN_SECRET is set");
    }
    if !config.secure_cookies {
        info!("  Session cookies are not marked Secure (development mode)");
    }

    let store = Arc::new(FilesystemStore::new(config.data_dir.clone()).await?);
    let icons = Arc::new(FilesystemBlobStore::new(config.data_dir.clone()).await?);
    let icons_dir = icons.dir().to_path_buf();
    let catalog = Arc::new(Catalog::new(store));

    let config = Arc::new(config);
    let state = Arc::new(AppState {
        config: config.clone(),
        catalog,
        icons,
    });

    let app = api::router(state)
        .nest_service("/icons", ServeDir::new(icons_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    // Start server with graceful shutdown
    let listener = TcpListener::bind(&config.listen_addr).await?;
    info!("AppDeck listening on http://{}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Handle shutdown signals (SIGINT, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
