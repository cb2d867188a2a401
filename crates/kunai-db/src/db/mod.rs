use std::future::Future;
use std::pin::Pin;

use crate::error::DbResult;

pub mod connection;
pub mod enums;
pub mod migrate;
pub mod query;
pub mod schema;

pub trait DbProvider: Send + Sync {
    fn get_connection<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = DbResult<connection::DbConnection<'a>>> + Send + 'a>>;
}
