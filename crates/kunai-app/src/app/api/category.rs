use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};
use serde::{Deserialize, Serialize};
use tracing::error;

use kunai_core::constants::CATEGORY_ROUTE_COMPONENT;
use kunai_db::model::category::Category;
use kunai_service::category;

use crate::app::api::request_context;
use crate::app::api::response::{
    ErrorResponse, MessageResponse, write_app_error, write_service_error,
};

/// ## Summary
/// Category response payload
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}

/// ## Summary
/// Create category request payload
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

/// ## Summary
/// GET /category - List all categories
///
/// Categories are shared reference data; every authenticated principal
/// sees the full list.
#[handler]
async fn list_categories_handler(depot: &mut Depot, res: &mut Response) {
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

    match category::list_categories(&mut conn, &engine, claims).await {
        Ok(categories) => {
            let body: Vec<CategoryResponse> =
                categories.into_iter().map(CategoryResponse::from).collect();
            res.render(Json(body));
        }
        Err(err) => write_service_error(res, &err),
    }
}

/// ## Summary
/// GET /category/{id} - Fetch a single category
///
/// ## Errors
/// Returns HTTP 404 if the id does not resolve
#[handler]
async fn get_category_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Some(category_id) = req.param::<i32>("id") else {
        res.status_code(StatusCode::NOT_FOUND);
        res.render(Json(ErrorResponse::new("Category not found")));
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

    match category::get_category(&mut conn, &engine, claims, category_id).await {
        Ok(found) => res.render(Json(CategoryResponse::from(found))),
        Err(err) => write_service_error(res, &err),
    }
}

/// ## Summary
/// POST /category - Create a category
///
/// ## Side Effects
/// - Inserts the category row
///
/// ## Errors
/// Returns HTTP 403 unless the principal is an administrator
/// Returns HTTP 400 if the name is empty
#[handler]
async fn create_category_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let body: CreateCategoryRequest = match req.parse_json().await {
        Ok(body) => body,
        Err(e) => {
            error!(error = ?e, "Failed to parse create category request");
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

    match category::create_category(&mut conn, &engine, claims, &body.name).await {
        Ok(created) => {
            res.status_code(StatusCode::CREATED);
            res.render(Json(CategoryResponse::from(created)));
        }
        Err(err) => write_service_error(res, &err),
    }
}

/// ## Summary
/// DELETE /category/{id} - Delete a category
///
/// Tasks pointing at the deleted category are left in place; their nested
/// category serializes as null from then on.
///
/// ## Errors
/// Returns HTTP 403 unless the principal is an administrator, before the
/// id is even looked up
/// Returns HTTP 404 if the id does not resolve
#[handler]
async fn delete_category_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Some(category_id) = req.param::<i32>("id") else {
        res.status_code(StatusCode::NOT_FOUND);
        res.render(Json(ErrorResponse::new("Category not found")));
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

    match category::delete_category(&mut conn, &engine, claims, category_id).await {
        Ok(()) => res.render(Json(MessageResponse::new("Category deleted successfully"))),
        Err(err) => write_service_error(res, &err),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(CATEGORY_ROUTE_COMPONENT)
        .get(list_categories_handler)
        .post(create_category_handler)
        .push(
            Router::with_path("{id}")
                .get(get_category_handler)
                .delete(delete_category_handler),
        )
}
