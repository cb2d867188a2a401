//! Shared configuration, constants, and error types for the kunai workspace.

pub mod config;
pub mod constants;
pub mod error;
