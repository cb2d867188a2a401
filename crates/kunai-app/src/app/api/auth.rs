use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};
use serde::{Deserialize, Serialize};
use tracing::error;

use kunai_core::constants::{AUTH_ROUTE_COMPONENT, LOGIN_ROUTE_COMPONENT, SIGN_UP_ROUTE_COMPONENT};
use kunai_service::auth::{account, tokens_from_depot};

use crate::app::api::response::{
    ErrorResponse, MessageResponse, write_app_error, write_service_error,
};
use crate::db_handler::get_db_from_depot;

/// ## Summary
/// Sign-up request payload
#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// ## Summary
/// Login request payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// ## Summary
/// Login response payload
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
}

/// ## Summary
/// POST /auth/sign-up - Register a new user account
///
/// ## Side Effects
/// - Creates a user row with a freshly hashed password
///
/// ## Errors
/// Returns HTTP 400 if a field is missing or implausible
/// Returns HTTP 409 if the username or email is already taken
#[handler]
async fn sign_up_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    tracing::debug!("Processing sign-up request");

    let body: SignUpRequest = match req.parse_json().await {
        Ok(body) => body,
        Err(e) => {
            error!(error = ?e, "Failed to parse sign-up request");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse::new("Invalid request body")));
            return;
        }
    };

    let provider = match get_db_from_depot(depot) {
        Ok(provider) => provider,
        Err(err) => {
            write_app_error(res, &err);
            return;
        }
    };

    let mut conn = match provider.get_connection().await {
        Ok(conn) => conn,
        Err(err) => {
            write_service_error(res, &err.into());
            return;
        }
    };

    match account::register(&mut conn, &body.username, &body.email, &body.password).await {
        Ok(user) => {
            tracing::info!(user_id = user.id, "User signed up");
            res.status_code(StatusCode::CREATED);
            res.render(Json(MessageResponse::new("User created successfully")));
        }
        Err(err) => write_service_error(res, &err),
    }
}

/// ## Summary
/// POST /auth/login - Exchange credentials for an access token
///
/// Unknown usernames and wrong passwords produce byte-identical 401
/// responses.
///
/// ## Errors
/// Returns HTTP 401 if the credentials do not match a stored account
#[handler]
async fn login_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    tracing::debug!("Processing login request");

    let body: LoginRequest = match req.parse_json().await {
        Ok(body) => body,
        Err(e) => {
            error!(error = ?e, "Failed to parse login request");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse::new("Invalid request body")));
            return;
        }
    };

    let tokens = match tokens_from_depot(depot) {
        Ok(tokens) => tokens,
        Err(err) => {
            write_service_error(res, &err);
            return;
        }
    };

    let provider = match get_db_from_depot(depot) {
        Ok(provider) => provider,
        Err(err) => {
            write_app_error(res, &err);
            return;
        }
    };

    let mut conn = match provider.get_connection().await {
        Ok(conn) => conn,
        Err(err) => {
            write_service_error(res, &err.into());
            return;
        }
    };

    match account::login(&mut conn, &tokens, &body.username, &body.password).await {
        Ok(access_token) => {
            res.render(Json(LoginResponse { access_token }));
        }
        Err(err) => write_service_error(res, &err),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(AUTH_ROUTE_COMPONENT)
        .push(Router::with_path(SIGN_UP_ROUTE_COMPONENT).post(sign_up_handler))
        .push(Router::with_path(LOGIN_ROUTE_COMPONENT).post(login_handler))
}
