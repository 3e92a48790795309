//! Bookshelf backend - GraphQL API for a book-cataloguing application
//!
//! This is the main entry point. All operations are exposed via GraphQL at
//! /graphql.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookshelf::app::{self, AppState};
use bookshelf::config::Config;
use bookshelf::db::Database;
use bookshelf::graphql::build_schema;
use bookshelf::services::{AuthConfig, AuthService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(Config::from_env()?);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookshelf=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Bookshelf backend");

    let db = Database::connect(&config.database_url).await?;
    db.init_schema().await?;
    tracing::info!("Database connected");

    let auth = AuthService::new(
        db.clone(),
        AuthConfig {
            jwt_secret: config.jwt_secret.clone(),
            bcrypt_cost: config.bcrypt_cost,
        },
    );

    let schema = build_schema(db.clone(), auth);
    let state = AppState {
        config: config.clone(),
        db,
        schema,
    };

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        "GraphQL playground: http://localhost:{}/graphql",
        config.port
    );

    axum::serve(listener, app::build_app(state)).await?;

    Ok(())
}
