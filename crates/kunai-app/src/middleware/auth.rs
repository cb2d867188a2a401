use salvo::Depot;
use salvo::http::StatusCode;
use salvo::http::header::AUTHORIZATION;
use salvo::writing::Json;
use tracing::error;

use kunai_service::auth::{TokenError, depot_keys, tokens_from_depot};

use crate::app::api::response::ErrorResponse;

/// ## Summary
/// Authentication middleware that verifies the bearer token and stores the
/// resulting claims in the depot. If verification fails, a 401 Unauthorized
/// response with a machine-readable error code is returned and the rest of
/// the route is skipped.
///
/// ## Side Effects
/// Inserts the verified [`kunai_service::auth::Claims`] into the depot for
/// downstream handlers to access.
///
/// ## Errors
/// Returns an HTTP 401 Unauthorized response if the token is missing,
/// malformed, or expired.
#[salvo::async_trait]
impl salvo::Handler for AuthMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        tracing::trace!("Verifying bearer token");

        let tokens = match tokens_from_depot(depot) {
            Ok(tokens) => tokens,
            Err(e) => {
                error!(error = ?e, "Failed to get token service from depot");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
                return;
            }
        };

        // Anything other than a well-formed "Bearer <token>" header counts
        // as an absent token.
        let token = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let verified = match token {
            Some(token) => tokens.verify(token),
            None => Err(TokenError::Missing),
        };

        match verified {
            Ok(claims) => {
                tracing::debug!(
                    principal_id = claims.principal_id,
                    role = %claims.role,
                    "Principal authenticated"
                );
                depot.insert(depot_keys::CLAIMS, claims);
            }
            Err(token_err) => {
                tracing::debug!(error = %token_err, "Rejected bearer token");
                res.status_code(StatusCode::UNAUTHORIZED);
                res.render(Json(ErrorResponse::with_code(
                    token_err.to_string(),
                    token_err.code(),
                )));
                ctrl.skip_rest();
            }
        }
    }
}

/// ## Summary
/// Middleware handler for authentication.
/// Use this as a handler in routes to protect them with authentication.
pub struct AuthMiddleware;
