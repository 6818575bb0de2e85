// SPDX-License-Identifier: MIT

//! Goaltrack API Server
//!
//! Creates and lists user-owned goals for authenticated callers; identity
//! is delegated to a hosted provider and verified via its JWKS.

use goaltrack_api::{
    config::Config,
    db::Db,
    services::{identity::IdentityProvider, GoalService, SessionVerifier, UserDirectory},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Goaltrack API");

    // Open the database and apply migrations
    let db = Db::connect(&config.database_url)
        .await
        .expect("Failed to open database");

    let identity: Arc<dyn IdentityProvider> = Arc::new(
        SessionVerifier::new(&config).expect("Failed to initialize session verifier"),
    );

    // Build shared state
    let state = Arc::new(AppState {
        directory: UserDirectory::new(db.clone()),
        goals: GoalService::new(db.clone()),
        config: config.clone(),
        db,
        identity,
    });

    // Build router
    let app = goaltrack_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("goaltrack_api=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
