mod auth;
mod category;
mod healthcheck;
pub mod response;
mod task;
mod user;

use std::sync::Arc;

use salvo::{Depot, Router};

use kunai_db::db::DbProvider;
use kunai_service::auth::{AuthzEngine, Claims, claims_from_depot, engine_from_depot};

use crate::db_handler::get_db_from_depot;
use crate::error::AppResult;
use crate::middleware::auth::AuthMiddleware;

// Re-export route constants from core
pub use kunai_core::constants::{
    AUTH_ROUTE_PREFIX, CATEGORY_ROUTE_PREFIX, HEALTHCHECK_ROUTE_PREFIX, LOGIN_ROUTE_PREFIX,
    SIGN_UP_ROUTE_PREFIX, TASK_ROUTE_PREFIX, USER_ROUTE_PREFIX,
};

/// ## Summary
/// Constructs the main router: public sign-up, login, and healthcheck
/// routes, plus the resource routes guarded by the bearer-token middleware.
#[must_use]
pub fn routes() -> Router {
    Router::new()
        .push(auth::routes())
        .push(healthcheck::routes())
        .push(
            Router::new()
                .hoop(AuthMiddleware)
                .push(task::routes())
                .push(category::routes())
                .push(user::routes()),
        )
}

/// ## Summary
/// Pulls the per-request authorization context and the database provider
/// out of the depot in one step.
///
/// ## Errors
/// Returns an error if the claims, engine, or provider were never stored,
/// which means the route was wired up without its middleware.
pub(crate) fn request_context(
    depot: &Depot,
) -> AppResult<(Claims, Arc<AuthzEngine>, Arc<dyn DbProvider + Send + Sync>)> {
    let claims = claims_from_depot(depot)?;
    let engine = engine_from_depot(depot)?;
    let provider = get_db_from_depot(depot)?;

    Ok((claims, engine, provider))
}
