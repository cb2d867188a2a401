//! Authentication and authorization flow.
//!
//! ## Module Organization
//!
//! - `account`: Registration, login, and admin bootstrap
//! - `action`: Actions a principal can attempt against a resource
//! - `claims`: Verified per-request identity record
//! - `depot`: Helpers for extracting authorization context from Salvo requests
//! - `engine`: Pure role/ownership decision engine
//! - `password`: Password hashing and verification with Argon2
//! - `resource`: Resource kinds subject to authorization
//! - `token`: Stateless bearer token issuance and verification

pub mod account;
pub mod action;
pub mod claims;
pub mod depot;
pub mod engine;
pub mod password;
pub mod resource;
pub mod token;

// Re-export commonly used types at module level
pub use action::Action;
pub use claims::Claims;
pub use depot::{claims_from_depot, depot_keys};
pub use engine::{AuthzEngine, AuthzEngineHandler, Decision, ListScope, engine_from_depot};
pub use resource::ResourceKind;
pub use token::{TokenError, TokenService, TokenServiceHandler, tokens_from_depot};
