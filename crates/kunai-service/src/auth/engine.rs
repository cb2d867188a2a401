//! Pure authorization decisions over roles and ownership.
//!
//! The engine never touches the store. Callers resolve ownership from the
//! persisted resource and pass it in, so a lookup miss surfaces as
//! `NotFound` before any ownership comparison; decisions that need no
//! ownership input (category mutations) are made before any store access
//! at all, and a denied principal never reaches the store.

use std::sync::Arc;

use salvo::async_trait;

use crate::error::{ServiceError, ServiceResult};

use super::{action::Action, claims::Claims, resource::ResourceKind};

/// Result of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Access is allowed.
    Allow,
    /// Access is denied.
    Deny,
}

impl Decision {
    /// Returns `true` if access is allowed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Convert to a `Result`, returning `Err(ServiceError::AuthorizationError)` if denied.
    ///
    /// ## Errors
    /// Returns `AuthorizationError` if access is denied.
    pub fn require(self, resource: ResourceKind, action: Action) -> ServiceResult<()> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny => Err(ServiceError::AuthorizationError(format!(
                "Access denied: {action} on {resource}"
            ))),
        }
    }
}

/// Row filter a list read must apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    /// Every row is visible.
    All,
    /// Only rows owned by the given principal are visible.
    Owner(i32),
}

/// Role/ownership decision engine.
///
/// Administrators may do anything. Ordinary users may read categories,
/// create tasks, and read, update, or delete only what they own; for user
/// rows, "own" means the row about themselves. The whole table is a pure
/// function of the claims and the resolved owner.
///
/// ## Usage
///
/// ```ignore
/// let engine = AuthzEngine::new();
/// engine.require(claims, ResourceKind::Task, Action::Update, Some(task.user_id))?;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthzEngine;

impl AuthzEngine {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// ## Summary
    /// Decides whether `claims` may perform `action` on a resource of the
    /// given kind. `owner` is the owning user id resolved from the persisted
    /// resource (for user rows, the target user id); categories have none.
    #[must_use]
    pub fn decide(
        &self,
        claims: Claims,
        resource: ResourceKind,
        action: Action,
        owner: Option<i32>,
    ) -> Decision {
        let decision = match (resource, action) {
            // Categories are global: readable by every authenticated
            // principal, mutable only by administrators.
            (ResourceKind::Category, Action::List | Action::Read) => Decision::Allow,
            (ResourceKind::Category, Action::Create | Action::Update | Action::Delete) => {
                Self::admin_only(claims)
            }

            // Any authenticated principal may create a task; the owner is
            // assigned from the verified claims, never from the request.
            (ResourceKind::Task, Action::Create) => Decision::Allow,

            // User rows are created through registration, not through this
            // table; the row exists for totality.
            (ResourceKind::User, Action::Create) => Self::admin_only(claims),

            (
                ResourceKind::Task | ResourceKind::User,
                Action::Read | Action::Update | Action::Delete,
            ) => Self::admin_or_owner(claims, owner),

            // List reads are always allowed and narrowed by `list_scope`.
            (ResourceKind::Task | ResourceKind::User, Action::List) => Decision::Allow,
        };

        tracing::debug!(
            principal_id = claims.principal_id,
            role = %claims.role,
            resource = %resource,
            action = %action,
            owner = ?owner,
            allowed = decision.is_allowed(),
            "Authorization decision"
        );

        decision
    }

    /// ## Summary
    /// Returns the row filter a list read must apply for `claims`.
    ///
    /// Administrators see every row. Everyone else sees only rows they own;
    /// categories are global and unscoped for all roles.
    #[must_use]
    pub fn list_scope(&self, claims: Claims, resource: ResourceKind) -> ListScope {
        match resource {
            ResourceKind::Category => ListScope::All,
            ResourceKind::Task | ResourceKind::User => {
                if claims.is_admin() {
                    ListScope::All
                } else {
                    ListScope::Owner(claims.principal_id)
                }
            }
        }
    }

    /// Check and require permission, returning an error if denied.
    ///
    /// This is a convenience method that combines `decide()` with `Decision::require()`.
    ///
    /// ## Errors
    /// Returns `AuthorizationError` if access is denied.
    pub fn require(
        &self,
        claims: Claims,
        resource: ResourceKind,
        action: Action,
        owner: Option<i32>,
    ) -> ServiceResult<()> {
        self.decide(claims, resource, action, owner)
            .require(resource, action)
    }

    fn admin_only(claims: Claims) -> Decision {
        if claims.is_admin() {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }

    fn admin_or_owner(claims: Claims, owner: Option<i32>) -> Decision {
        if claims.is_admin() || owner == Some(claims.principal_id) {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

pub struct AuthzEngineHandler {
    pub engine: Arc<AuthzEngine>,
}

#[async_trait]
impl salvo::Handler for AuthzEngineHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(self.engine.clone());
    }
}

/// ## Summary
/// Retrieves the authorization engine from the depot.
///
/// ## Errors
/// Returns an error if the engine is not found in the depot.
pub fn engine_from_depot(depot: &salvo::Depot) -> ServiceResult<Arc<AuthzEngine>> {
    depot
        .obtain::<Arc<AuthzEngine>>()
        .cloned()
        .map_err(|_err| ServiceError::InvariantViolation("Authorization engine not found in depot"))
}
