//! Verified per-request identity.

use kunai_db::db::enums::Role;

/// Identity certified by a verified access token.
///
/// Built exactly once per request, at token verification, and passed by
/// value through the call chain. Role changes made after issuance are not
/// reflected until the principal authenticates again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claims {
    /// Persisted id of the authenticated user.
    pub principal_id: i32,
    pub role: Role,
}

impl Claims {
    #[must_use]
    pub const fn new(principal_id: i32, role: Role) -> Self {
        Self { principal_id, role }
    }

    /// Returns `true` if the principal carries the administrator role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}
