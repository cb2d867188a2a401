//! Stateless bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying the principal id and role. There is no
//! server-side session state and no revocation: a signed token stays valid
//! for its whole lifetime, even across role changes.

use std::sync::Arc;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use salvo::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use kunai_db::db::connection::DbConnection;
use kunai_db::db::enums::Role;
use kunai_db::db::query;
use kunai_db::model::user::User;

use crate::error::{ServiceError, ServiceResult};

use super::claims::Claims;

/// Verification failures for bearer tokens.
///
/// Each variant maps to a machine-readable code rendered in 401 bodies so
/// clients can distinguish a missing token from a bad or stale one.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("Request does not contain an access token.")]
    Missing,

    #[error("Signature verification failed.")]
    Invalid,

    #[error("The token has expired.")]
    Expired,
}

impl TokenError {
    /// Returns the wire error code for this failure.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Missing => "authorization_required",
            Self::Invalid => "invalid_token",
            Self::Expired => "token_expired",
        }
    }
}

/// Signed claim set carried inside the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Principal id as a string, per RFC 7519 `sub`.
    pub sub: String,
    pub role: Role,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at time (Unix timestamp).
    pub iat: i64,
    /// Token id.
    pub jti: String,
}

/// Issues and verifies access tokens.
///
/// Keys and validation rules are built once at process start and shared
/// through the depot.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs,
        }
    }

    /// ## Summary
    /// Signs a token certifying the given principal and role.
    ///
    /// ## Errors
    /// Returns `InvalidConfiguration` if signing fails.
    pub fn sign(&self, principal_id: i32, role: Role) -> ServiceResult<String> {
        let now = chrono::Utc::now().timestamp();
        let claims = TokenClaims {
            sub: principal_id.to_string(),
            role,
            exp: now + self.ttl_secs,
            iat: now,
            jti: uuid::Uuid::now_v7().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::InvalidConfiguration(format!("Failed to sign token: {e}")))
    }

    /// ## Summary
    /// Issues a token for a stored principal, embedding the role the store
    /// holds right now. Later role changes do not touch already-issued
    /// tokens.
    ///
    /// ## Errors
    /// Returns `NotFound` if the principal id does not resolve, or an error
    /// if the lookup or signing fails.
    #[tracing::instrument(skip(self, conn))]
    pub async fn issue(
        &self,
        conn: &mut DbConnection<'_>,
        principal_id: i32,
    ) -> ServiceResult<String> {
        let user: Option<User> = query::user::by_id(principal_id)
            .select(User::as_select())
            .first(conn)
            .await
            .optional()?;

        let Some(user) = user else {
            return Err(ServiceError::NotFound("Principal not found".to_string()));
        };

        tracing::debug!(principal_id, role = %user.role, "Issuing access token");

        self.sign(user.id, user.role)
    }

    /// ## Summary
    /// Verifies a bearer token and extracts the identity it certifies.
    ///
    /// ## Errors
    /// Returns `Expired` for a correctly signed token past its expiry, and
    /// `Invalid` for everything else that fails decoding, including a `sub`
    /// that is not an integer id.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data =
            decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(|err| {
                match err.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                    _other => TokenError::Invalid,
                }
            })?;

        let principal_id = data
            .claims
            .sub
            .parse::<i32>()
            .map_err(|_e| TokenError::Invalid)?;

        Ok(Claims::new(principal_id, data.claims.role))
    }
}

pub struct TokenServiceHandler {
    pub tokens: Arc<TokenService>,
}

#[async_trait]
impl salvo::Handler for TokenServiceHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(self.tokens.clone());
    }
}

/// ## Summary
/// Retrieves the token service from the depot.
///
/// ## Errors
/// Returns an error if the token service is not found in the depot.
pub fn tokens_from_depot(depot: &salvo::Depot) -> ServiceResult<Arc<TokenService>> {
    depot
        .obtain::<Arc<TokenService>>()
        .cloned()
        .map_err(|_err| ServiceError::InvariantViolation("Token service not found in depot"))
}
