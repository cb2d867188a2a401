//! Domain services for kunai: authentication, authorization, and the
//! task/category/user resource flows.

pub mod auth;
pub mod category;
pub mod error;
pub mod task;
pub mod user;
