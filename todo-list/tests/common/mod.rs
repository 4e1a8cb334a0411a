use axum_extra::extract::cookie::Key;
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use todo_list::todo::web::TodoState;

/// Opens a fresh in-memory SQLite database with all migrations applied.
///
/// The pool is capped at one connection because every SQLite memory connection is its own database.
pub async fn setup_db() -> anyhow::Result<DatabaseConnection> {
    let _ = tracing_subscriber::fmt().try_init();
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[allow(dead_code)]
pub fn todo_state(db: DatabaseConnection) -> TodoState {
    TodoState {
        db: Arc::new(db),
        cookie_key: Key::generate(),
    }
}
