use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};
use serde::{Deserialize, Serialize};
use tracing::error;

use kunai_core::constants::TASK_ROUTE_COMPONENT;
use kunai_service::task::{self, CreateTaskContext, TaskDetail, UpdateTaskContext};

use crate::app::api::category::CategoryResponse;
use crate::app::api::request_context;
use crate::app::api::response::{
    ErrorResponse, MessageResponse, write_app_error, write_service_error,
};

/// ## Summary
/// Create task request payload.
///
/// There is no owner field; the task always belongs to the authenticated
/// principal, and unknown body fields are ignored.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub category_id: i32,
}

/// ## Summary
/// Update task request payload; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub completed: Option<bool>,
    pub category_id: Option<i32>,
}

/// ## Summary
/// Task response payload with its category nested, when that category
/// still exists.
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub completed: bool,
    pub category_id: i32,
    pub category: Option<CategoryResponse>,
}

impl From<TaskDetail> for TaskResponse {
    fn from(detail: TaskDetail) -> Self {
        Self {
            id: detail.task.id,
            title: detail.task.title,
            description: detail.task.description,
            due_date: detail.task.due_date,
            completed: detail.task.completed,
            category_id: detail.task.category_id,
            category: detail.category.map(CategoryResponse::from),
        }
    }
}

/// ## Summary
/// GET /task - List visible tasks
///
/// Administrators see every task; everyone else only their own.
#[handler]
async fn list_tasks_handler(depot: &mut Depot, res: &mut Response) {
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

    match task::list_tasks(&mut conn, &engine, claims).await {
        Ok(details) => {
            let body: Vec<TaskResponse> = details.into_iter().map(TaskResponse::from).collect();
            res.render(Json(body));
        }
        Err(err) => write_service_error(res, &err),
    }
}

/// ## Summary
/// GET /task/{id} - Fetch a single task
///
/// ## Errors
/// Returns HTTP 404 if the id does not resolve
/// Returns HTTP 403 if the task belongs to someone else
#[handler]
async fn get_task_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Some(task_id) = req.param::<i32>("id") else {
        res.status_code(StatusCode::NOT_FOUND);
        res.render(Json(ErrorResponse::new("Task not found")));
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

    match task::get_task(&mut conn, &engine, claims, task_id).await {
        Ok(detail) => res.render(Json(TaskResponse::from(detail))),
        Err(err) => write_service_error(res, &err),
    }
}

/// ## Summary
/// POST /task - Create a task owned by the authenticated principal
///
/// ## Side Effects
/// - Inserts the task row
///
/// ## Errors
/// Returns HTTP 400 if the title is empty
/// Returns HTTP 404 if the referenced category does not exist
#[handler]
async fn create_task_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let body: CreateTaskRequest = match req.parse_json().await {
        Ok(body) => body,
        Err(e) => {
            error!(error = ?e, "Failed to parse create task request");
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

    let ctx = CreateTaskContext {
        title: body.title,
        description: body.description,
        due_date: body.due_date,
        category_id: body.category_id,
    };

    match task::create_task(&mut conn, &engine, claims, &ctx).await {
        Ok(detail) => {
            res.status_code(StatusCode::CREATED);
            res.render(Json(TaskResponse::from(detail)));
        }
        Err(err) => write_service_error(res, &err),
    }
}

/// ## Summary
/// PUT /task/{id} - Partially update a task
///
/// Only fields present in the body are written; a body with no updatable
/// fields is a no-op that returns the current state.
///
/// ## Errors
/// Returns HTTP 404 if the id, or a newly referenced category, does not
/// resolve
/// Returns HTTP 403 if the task belongs to someone else
#[handler]
async fn update_task_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Some(task_id) = req.param::<i32>("id") else {
        res.status_code(StatusCode::NOT_FOUND);
        res.render(Json(ErrorResponse::new("Task not found")));
        return;
    };

    let body: UpdateTaskRequest = match req.parse_json().await {
        Ok(body) => body,
        Err(e) => {
            error!(error = ?e, "Failed to parse update task request");
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

    let ctx = UpdateTaskContext {
        title: body.title,
        description: body.description,
        due_date: body.due_date,
        completed: body.completed,
        category_id: body.category_id,
    };

    match task::update_task(&mut conn, &engine, claims, task_id, &ctx).await {
        Ok(detail) => res.render(Json(TaskResponse::from(detail))),
        Err(err) => write_service_error(res, &err),
    }
}

/// ## Summary
/// DELETE /task/{id} - Delete a task
///
/// ## Errors
/// Returns HTTP 404 if the id does not resolve
/// Returns HTTP 403 if the task belongs to someone else
#[handler]
async fn delete_task_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Some(task_id) = req.param::<i32>("id") else {
        res.status_code(StatusCode::NOT_FOUND);
        res.render(Json(ErrorResponse::new("Task not found")));
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

    match task::delete_task(&mut conn, &engine, claims, task_id).await {
        Ok(()) => res.render(Json(MessageResponse::new("Task deleted successfully"))),
        Err(err) => write_service_error(res, &err),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(TASK_ROUTE_COMPONENT)
        .get(list_tasks_handler)
        .post(create_task_handler)
        .push(
            Router::with_path("{id}")
                .get(get_task_handler)
                .put(update_task_handler)
                .delete(delete_task_handler),
        )
}
