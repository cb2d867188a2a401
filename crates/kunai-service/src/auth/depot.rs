//! Depot helpers for extracting authorization context from Salvo requests.

use crate::error::{ServiceError, ServiceResult};

use super::claims::Claims;

pub mod depot_keys {
    pub const CLAIMS: &str = "__claims";
}

/// Get the verified claims of the authenticated principal from the depot.
///
/// The auth middleware stores claims exactly once per request, after token
/// verification; a missing entry means the route was reached without it.
///
/// ## Errors
/// Returns `NotAuthenticated` if no claims were stored for this request.
pub fn claims_from_depot(depot: &salvo::Depot) -> ServiceResult<Claims> {
    depot
        .get::<Claims>(depot_keys::CLAIMS)
        .copied()
        .map_err(|_e| ServiceError::NotAuthenticated)
}
