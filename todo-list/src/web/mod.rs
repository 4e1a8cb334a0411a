use axum::Router;
use migration::MigratorTrait;
use sea_orm::Database;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config;
use crate::todo::web::{TodoState, create_todo_router};

/// Builds the application router with every route and the tracing layer.
pub fn create_app(state: TodoState) -> Router {
    Router::new()
        .route("/health", axum::routing::get(health_check_handler))
        .merge(create_todo_router(state))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: config::Config) -> anyhow::Result<()> {
    let cookie_key = config.cookie_key()?;

    let db = Database::connect(&config.db_url).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let todo_state = TodoState {
        db: Arc::new(db),
        cookie_key,
    };
    let app = create_app(todo_state);

    let server_address = config.server_address();
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}
