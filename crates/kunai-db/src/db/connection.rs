use diesel::SqliteConnection;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::pooled_connection::{AsyncDieselConnectionManager, ManagerConfig};
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::{AsyncConnection, SimpleAsyncConnection};

use crate::db::DbProvider;
use crate::error::DbResult;

pub type DbConn = SyncConnectionWrapper<SqliteConnection>;
pub type DbPool = Pool<DbConn>;
pub type DbConnection<'pool> = PooledConnection<'pool, DbConn>;

/// ## Summary
/// Creates a new database connection pool.
///
/// Every pooled connection gets a `busy_timeout` so concurrent writers queue
/// on the SQLite lock instead of failing immediately.
///
/// ## Errors
/// Returns an error if the pool cannot be created with the provided database URL.
#[tracing::instrument(skip(database_url), fields(pool_size = size))]
pub async fn create_pool(database_url: &str, size: u32) -> anyhow::Result<DbPool> {
    tracing::debug!("Creating database connection pool");

    let mut manager_config = ManagerConfig::default();
    manager_config.custom_setup = Box::new(|url: &str| {
        let url = url.to_owned();
        Box::pin(async move {
            let mut conn = DbConn::establish(&url).await?;
            conn.batch_execute("PRAGMA busy_timeout = 5000;")
                .await
                .map_err(|err| {
                    diesel::result::ConnectionError::CouldntSetupConfiguration(err)
                })?;
            Ok(conn)
        })
    });

    let config =
        AsyncDieselConnectionManager::<DbConn>::new_with_config(database_url, manager_config);

    let pool = Pool::builder()
        .max_size(size)
        .min_idle(Some(size))
        .test_on_check_out(false)
        .idle_timeout(None)
        .max_lifetime(None)
        .build(config)
        .await?;

    tracing::info!(
        pool_size = size,
        "Database connection pool created successfully"
    );

    Ok(pool)
}

impl DbProvider for DbPool {
    #[tracing::instrument(skip(self))]
    fn get_connection<'a>(
        &'a self,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = DbResult<DbConnection<'a>>> + Send + 'a>>
    {
        Box::pin(async move {
            let conn = self.get().await?;
            Ok(conn)
        })
    }
}
