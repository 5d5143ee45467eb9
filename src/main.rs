use std::{net::SocketAddr, sync::Arc};

use tokio::signal;
use tracing::{error, info, warn};

use yatube::{
    auth::hash_password,
    config::{Config, StorageBackend},
    create_router,
    db::{seed_demo_data, Database, MemoryStore, Repository},
    middleware::init_tracing,
    AppState,
};

/// Password of the author created by the demo seed.
const DEMO_PASSWORD: &str = "yatube-demo";

#[tokio::main]
async fn main() {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize structured logging
    if let Err(e) = init_tracing(&config.environment) {
        eprintln!("Failed to initialize tracing: {}", e);
        std::process::exit(1);
    }
    info!("Configuration loaded successfully");

    let repo: Arc<dyn Repository> = match (config.storage, config.database.clone()) {
        (StorageBackend::Postgres, Some(database_config)) => {
            let database = match Database::new(database_config).await {
                Ok(db) => {
                    info!("Database connection established");
                    db
                }
                Err(e) => {
                    error!("Failed to connect to database: {}", e);
                    std::process::exit(1);
                }
            };

            // Run database migrations
            if let Err(e) = database.migrate().await {
                error!("Failed to run database migrations: {}", e);
                std::process::exit(1);
            }
            info!("Database migrations completed successfully");

            Arc::new(database)
        }
        (StorageBackend::Postgres, None) => {
            error!("PostgreSQL storage selected but no database configuration was loaded");
            std::process::exit(1);
        }
        (StorageBackend::Memory, _) => {
            warn!("Using in-memory storage, all data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    if config.seed_demo_data {
        let seeded = match hash_password(DEMO_PASSWORD) {
            Ok(password_hash) => seed_demo_data(repo.as_ref(), password_hash).await,
            Err(e) => Err(e),
        };
        if let Err(e) = seeded {
            error!("Failed to seed demo data: {}", e);
            std::process::exit(1);
        }
    }

    let state = AppState::with_page_size(repo, config.posts_per_page);
    let app = create_router(state, config.request_timeout);

    // Create socket address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting server on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            info!("Server listening on {}", addr);
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Start the server with graceful shutdown handling
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Graceful shutdown signal handler
/// Listens for SIGTERM and SIGINT signals
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
            info!("Received Ctrl+C signal, initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, initiating graceful shutdown");
        },
    }
}
