//! Diesel schema, models, and connection pooling for the kunai task store.

pub mod db;
pub mod error;
pub mod model;
