//! Category service.
//!
//! Categories are global rows without an owner. Mutations are role-gated
//! only, so those decisions happen before any store access and a denied
//! principal learns nothing about what exists.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use kunai_db::db::connection::DbConnection;
use kunai_db::db::{query, schema};
use kunai_db::model::category::{Category, NewCategory};

use crate::auth::{Action, AuthzEngine, Claims, ResourceKind};
use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Lists every category. Visible to any authenticated principal.
///
/// ## Errors
/// Returns an error if the query fails.
pub async fn list_categories(
    conn: &mut DbConnection<'_>,
    engine: &AuthzEngine,
    claims: Claims,
) -> ServiceResult<Vec<Category>> {
    engine.require(claims, ResourceKind::Category, Action::List, None)?;

    let categories = query::category::all()
        .select(Category::as_select())
        .load(conn)
        .await?;

    Ok(categories)
}

/// ## Summary
/// Fetches a single category. Visible to any authenticated principal.
///
/// ## Errors
/// Returns `NotFound` if the id does not resolve.
pub async fn get_category(
    conn: &mut DbConnection<'_>,
    engine: &AuthzEngine,
    claims: Claims,
    category_id: i32,
) -> ServiceResult<Category> {
    engine.require(claims, ResourceKind::Category, Action::Read, None)?;

    let category: Option<Category> = query::category::by_id(category_id)
        .select(Category::as_select())
        .first(conn)
        .await
        .optional()?;

    category.ok_or_else(|| ServiceError::NotFound("Category not found".to_string()))
}

/// ## Summary
/// Creates a category. Administrators only; the decision is made before the
/// store is touched.
///
/// ## Errors
/// - `AuthorizationError` for non-administrators.
/// - `ValidationError` if the name is empty.
pub async fn create_category(
    conn: &mut DbConnection<'_>,
    engine: &AuthzEngine,
    claims: Claims,
    name: &str,
) -> ServiceResult<Category> {
    engine.require(claims, ResourceKind::Category, Action::Create, None)?;

    if name.trim().is_empty() {
        return Err(ServiceError::ValidationError(
            "name must not be empty".to_string(),
        ));
    }

    let category: Category = diesel::insert_into(schema::categories::table)
        .values(&NewCategory { name })
        .returning(Category::as_returning())
        .get_result(conn)
        .await?;

    tracing::info!(category_id = category.id, "Category created");

    Ok(category)
}

/// ## Summary
/// Deletes a category. Administrators only; the role check precedes the
/// lookup, so non-administrators get a 403 even for ids that do not exist.
///
/// Referencing tasks are left in place and subsequently serialize a `null`
/// category.
///
/// ## Errors
/// - `AuthorizationError` for non-administrators.
/// - `NotFound` if the id does not resolve.
pub async fn delete_category(
    conn: &mut DbConnection<'_>,
    engine: &AuthzEngine,
    claims: Claims,
    category_id: i32,
) -> ServiceResult<()> {
    engine.require(claims, ResourceKind::Category, Action::Delete, None)?;

    let category: Option<Category> = query::category::by_id(category_id)
        .select(Category::as_select())
        .first(conn)
        .await
        .optional()?;
    if category.is_none() {
        return Err(ServiceError::NotFound("Category not found".to_string()));
    }

    diesel::delete(schema::categories::table.filter(schema::categories::id.eq(category_id)))
        .execute(conn)
        .await?;

    tracing::info!(category_id, "Category deleted");

    Ok(())
}
