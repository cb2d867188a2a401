//! Embedded migrations, applied at startup and by the test harness.

use diesel::Connection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// ## Summary
/// Applies all pending migrations against the given database.
///
/// The migration harness is synchronous, so this runs on a blocking thread
/// with its own short-lived connection.
///
/// ## Errors
/// Returns an error if the connection cannot be established or a migration
/// fails to apply.
pub async fn run_migrations(database_url: &str) -> anyhow::Result<()> {
    let url = database_url.to_owned();

    tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        let mut conn = diesel::SqliteConnection::establish(&url)?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|err| anyhow::anyhow!("failed to run migrations: {err}"))?;

        tracing::debug!(applied = applied.len(), "Applied pending database migrations");

        Ok(())
    })
    .await?
}
