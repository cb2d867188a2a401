use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};
use serde::{Deserialize, Serialize};
use tracing::error;

use kunai_core::constants::USER_ROUTE_COMPONENT;
use kunai_db::db::enums::Role;
use kunai_service::user::{self, UpdateUserContext, UserDetail};

use crate::app::api::request_context;
use crate::app::api::response::{
    ErrorResponse, MessageResponse, write_app_error, write_service_error,
};
use crate::app::api::task::TaskResponse;

/// ## Summary
/// Update user request payload; absent fields are left untouched. A
/// supplied password is re-hashed before storage.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// ## Summary
/// User response payload with owned tasks nested. The password hash never
/// appears here.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub registered_on: chrono::NaiveDateTime,
    pub tasks: Vec<TaskResponse>,
}

impl From<UserDetail> for UserResponse {
    fn from(detail: UserDetail) -> Self {
        Self {
            id: detail.user.id,
            username: detail.user.username,
            email: detail.user.email,
            role: detail.user.role,
            registered_on: detail.user.registered_on,
            tasks: detail.tasks.into_iter().map(TaskResponse::from).collect(),
        }
    }
}

/// ## Summary
/// GET /user - List visible users
///
/// Administrators see everyone; everyone else sees only themselves.
#[handler]
async fn list_users_handler(depot: &mut Depot, res: &mut Response) {
    let (claims, engine, provider) = match request_context(depot) {
        Ok(context) => context,
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

    match user::list_users(&mut conn, &engine, claims).await {
        Ok(details) => {
            let body: Vec<UserResponse> = details.into_iter().map(UserResponse::from).collect();
            res.render(Json(body));
        }
        Err(err) => write_service_error(res, &err),
    }
}

/// ## Summary
/// GET /user/{id} - Fetch a single user with owned tasks
///
/// ## Errors
/// Returns HTTP 404 if the id does not resolve
/// Returns HTTP 403 if the row is about someone else and the principal is
/// not an administrator
#[handler]
async fn get_user_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Some(user_id) = req.param::<i32>("id") else {
        res.status_code(StatusCode::NOT_FOUND);
        res.render(Json(ErrorResponse::new("User not found")));
        return;
    };

    let (claims, engine, provider) = match request_context(depot) {
        Ok(context) => context,
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

    match user::get_user(&mut conn, &engine, claims, user_id).await {
        Ok(detail) => res.render(Json(UserResponse::from(detail))),
        Err(err) => write_service_error(res, &err),
    }
}

/// ## Summary
/// PUT /user/{id} - Partially update a user
///
/// Only fields present in the body are written.
///
/// ## Errors
/// Returns HTTP 404 if the id does not resolve
/// Returns HTTP 403 if the row is about someone else and the principal is
/// not an administrator
/// Returns HTTP 409 if the new username or email is already taken
#[handler]
async fn update_user_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Some(user_id) = req.param::<i32>("id") else {
        res.status_code(StatusCode::NOT_FOUND);
        res.render(Json(ErrorResponse::new("User not found")));
        return;
    };

    let body: UpdateUserRequest = match req.parse_json().await {
        Ok(body) => body,
        Err(e) => {
            error!(error = ?e, "Failed to parse update user request");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse::new("Invalid request body")));
            return;
        }
    };

    let (claims, engine, provider) = match request_context(depot) {
        Ok(context) => context,
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

    let ctx = UpdateUserContext {
        username: body.username,
        email: body.email,
        password: body.password,
    };

    match user::update_user(&mut conn, &engine, claims, user_id, &ctx).await {
        Ok(detail) => res.render(Json(UserResponse::from(detail))),
        Err(err) => write_service_error(res, &err),
    }
}

/// ## Summary
/// DELETE /user/{id} - Delete a user and every task it owns
///
/// ## Side Effects
/// - Removes the user's tasks and the user row in a single transaction
///
/// ## Errors
/// Returns HTTP 404 if the id does not resolve
/// Returns HTTP 403 if the row is about someone else and the principal is
/// not an administrator
#[handler]
async fn delete_user_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Some(user_id) = req.param::<i32>("id") else {
        res.status_code(StatusCode::NOT_FOUND);
        res.render(Json(ErrorResponse::new("User not found")));
        return;
    };

    let (claims, engine, provider) = match request_context(depot) {
        Ok(context) => context,
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

    match user::delete_user(&mut conn, &engine, claims, user_id).await {
        Ok(()) => res.render(Json(MessageResponse::new("User deleted successfully"))),
        Err(err) => write_service_error(res, &err),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(USER_ROUTE_COMPONENT)
        .get(list_users_handler)
        .push(
            Router::with_path("{id}")
                .get(get_user_handler)
                .put(update_user_handler)
                .delete(delete_user_handler),
        )
}
