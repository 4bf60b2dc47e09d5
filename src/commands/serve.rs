//! Serve command - Starts the HTTP server.

use std::sync::Arc;

use crate::api::{create_router_with_media, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    let db = Database::connect(&config).await?;
    let db = Arc::new(db);

    tokio::fs::create_dir_all(&config.media_root)
        .await
        .map_err(|e| AppError::storage(format!("{}: {}", config.media_root, e)))?;
    let media_root = config.media_root.clone();

    let app_state = AppState::from_config(db, config);
    let app = create_router_with_media(app_state, &media_root);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!(%addr, media_root = %media_root, "Server running");

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}
