//! HTTP surface for the Kunai task management server.
//!
//! This crate wires the service layer to Salvo: route construction, the
//! bearer-token middleware, and the depot handlers that share the pool,
//! configuration, token service, and authorization engine with request
//! handlers.

pub mod app;
pub mod config;
pub mod db_handler;
pub mod error;
pub mod middleware;
