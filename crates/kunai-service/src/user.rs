//! User service.
//!
//! User rows double as authorization targets: the "owner" of a user row is
//! the user itself. Deleting a user removes the tasks it owns in the same
//! transaction, so a failure past the first delete leaves nothing half
//! done.

use std::collections::HashMap;

use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use kunai_db::db::connection::DbConnection;
use kunai_db::db::{query, schema};
use kunai_db::model::category::Category;
use kunai_db::model::task::Task;
use kunai_db::model::user::{User, UserChangeset};

use crate::auth::password::hash_password;
use crate::auth::{Action, AuthzEngine, Claims, ListScope, ResourceKind};
use crate::error::{ServiceError, ServiceResult, map_unique_violation};
use crate::task::TaskDetail;

/// Context for a partial user update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserContext {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A user together with the tasks it owns.
#[derive(Debug, Clone)]
pub struct UserDetail {
    pub user: User,
    pub tasks: Vec<TaskDetail>,
}

/// ## Summary
/// Lists the users visible to the principal: administrators see everyone,
/// everyone else sees only themselves.
///
/// ## Errors
/// Returns an error if the query fails.
pub async fn list_users(
    conn: &mut DbConnection<'_>,
    engine: &AuthzEngine,
    claims: Claims,
) -> ServiceResult<Vec<UserDetail>> {
    engine.require(claims, ResourceKind::User, Action::List, None)?;

    let users: Vec<User> = match engine.list_scope(claims, ResourceKind::User) {
        ListScope::All => {
            query::user::all()
                .select(User::as_select())
                .load(conn)
                .await?
        }
        ListScope::Owner(principal_id) => {
            query::user::by_id(principal_id)
                .select(User::as_select())
                .load(conn)
                .await?
        }
    };

    with_tasks(conn, users).await
}

/// ## Summary
/// Fetches a single user with the tasks it owns.
///
/// ## Errors
/// - `NotFound` if the id does not resolve, checked before ownership.
/// - `AuthorizationError` if the row is about someone else and the
///   principal is not an administrator.
pub async fn get_user(
    conn: &mut DbConnection<'_>,
    engine: &AuthzEngine,
    claims: Claims,
    user_id: i32,
) -> ServiceResult<UserDetail> {
    let user = find_user(conn, user_id).await?;

    engine.require(claims, ResourceKind::User, Action::Read, Some(user.id))?;

    let mut details = with_tasks(conn, vec![user]).await?;
    details
        .pop()
        .ok_or(ServiceError::InvariantViolation("user detail vanished"))
}

/// ## Summary
/// Applies a partial update to a user. Only fields present in the context
/// are written; a supplied password is re-hashed before storage and never
/// echoed back.
///
/// ## Errors
/// - `NotFound` if the id does not resolve, checked before ownership.
/// - `AuthorizationError` if the row is about someone else and the
///   principal is not an administrator.
/// - `Conflict` if the new username or email is already taken.
/// - `ValidationError` if a supplied field is empty or implausible.
pub async fn update_user(
    conn: &mut DbConnection<'_>,
    engine: &AuthzEngine,
    claims: Claims,
    user_id: i32,
    ctx: &UpdateUserContext,
) -> ServiceResult<UserDetail> {
    let user = find_user(conn, user_id).await?;

    engine.require(claims, ResourceKind::User, Action::Update, Some(user.id))?;

    if let Some(username) = &ctx.username {
        if username.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "username must not be empty".to_string(),
            ));
        }
        let taken = schema::users::table
            .filter(schema::users::username.eq(username))
            .filter(schema::users::id.ne(user_id))
            .select(User::as_select())
            .first(conn)
            .await
            .optional()?;
        if taken.is_some() {
            return Err(ServiceError::Conflict("User already exists".to_string()));
        }
    }

    if let Some(email) = &ctx.email {
        if email.trim().is_empty() || !email.contains('@') {
            return Err(ServiceError::ValidationError(
                "email must be a valid address".to_string(),
            ));
        }
        let taken = schema::users::table
            .filter(schema::users::email.eq(email))
            .filter(schema::users::id.ne(user_id))
            .select(User::as_select())
            .first(conn)
            .await
            .optional()?;
        if taken.is_some() {
            return Err(ServiceError::Conflict("User already exists".to_string()));
        }
    }

    if let Some(password) = &ctx.password {
        if password.is_empty() {
            return Err(ServiceError::ValidationError(
                "password must not be empty".to_string(),
            ));
        }
    }

    let changeset = UserChangeset {
        username: ctx.username.clone(),
        email: ctx.email.clone(),
        password_hash: ctx.password.as_deref().map(hash_password).transpose()?,
    };

    if !changeset.is_empty() {
        diesel::update(schema::users::table.filter(schema::users::id.eq(user_id)))
            .set(&changeset)
            .execute(conn)
            .await
            .map_err(map_unique_violation)?;

        tracing::debug!(user_id, "User updated");
    }

    get_user(conn, engine, claims, user_id).await
}

/// ## Summary
/// Deletes a user and every task it owns.
///
/// ## Side Effects
/// - Removes the user's tasks and the user row in a single transaction;
///   a failure rolls the whole cascade back.
///
/// ## Errors
/// - `NotFound` if the id does not resolve, checked before ownership.
/// - `AuthorizationError` if the row is about someone else and the
///   principal is not an administrator.
pub async fn delete_user(
    conn: &mut DbConnection<'_>,
    engine: &AuthzEngine,
    claims: Claims,
    user_id: i32,
) -> ServiceResult<()> {
    let user = find_user(conn, user_id).await?;

    engine.require(claims, ResourceKind::User, Action::Delete, Some(user.id))?;

    conn.transaction::<_, ServiceError, _>(|tx| {
        async move {
            diesel::delete(schema::tasks::table.filter(schema::tasks::user_id.eq(user_id)))
                .execute(tx)
                .await?;

            diesel::delete(schema::users::table.filter(schema::users::id.eq(user_id)))
                .execute(tx)
                .await?;

            Ok(())
        }
        .scope_boxed()
    })
    .await?;

    tracing::info!(user_id, "User deleted with owned tasks");

    Ok(())
}

async fn find_user(conn: &mut DbConnection<'_>, user_id: i32) -> ServiceResult<User> {
    let user: Option<User> = query::user::by_id(user_id)
        .select(User::as_select())
        .first(conn)
        .await
        .optional()?;

    user.ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
}

async fn with_tasks(
    conn: &mut DbConnection<'_>,
    users: Vec<User>,
) -> ServiceResult<Vec<UserDetail>> {
    let user_ids: Vec<i32> = users.iter().map(|u| u.id).collect();

    let rows: Vec<(Task, Option<Category>)> = schema::tasks::table
        .left_join(schema::categories::table)
        .filter(schema::tasks::user_id.eq_any(&user_ids))
        .select((Task::as_select(), Option::<Category>::as_select()))
        .order(schema::tasks::id.asc())
        .load(conn)
        .await?;

    let mut by_owner: HashMap<i32, Vec<TaskDetail>> = HashMap::new();
    for (task, category) in rows {
        by_owner
            .entry(task.user_id)
            .or_default()
            .push(TaskDetail { task, category });
    }

    Ok(users
        .into_iter()
        .map(|user| {
            let tasks = by_owner.remove(&user.id).unwrap_or_default();
            UserDetail { user, tasks }
        })
        .collect())
}
