//! Task service.
//!
//! Every operation consults the authorization engine before touching the
//! store, except where ownership must be resolved from the persisted row
//! first; there a lookup miss surfaces as `NotFound` before the ownership
//! comparison, so a nonexistent task never turns into a 403.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use kunai_db::db::connection::DbConnection;
use kunai_db::db::{query, schema};
use kunai_db::model::category::Category;
use kunai_db::model::task::{NewTask, Task, TaskChangeset};
use kunai_db::model::user::User;

use crate::auth::{Action, AuthzEngine, Claims, ListScope, ResourceKind};
use crate::error::{ServiceError, ServiceResult};

/// Context for task creation. The owner is deliberately absent: it is
/// always the authenticated principal.
#[derive(Debug, Clone)]
pub struct CreateTaskContext {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub category_id: i32,
}

/// Context for a partial task update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateTaskContext {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub completed: Option<bool>,
    pub category_id: Option<i32>,
}

/// A task together with the category it references, if that category still
/// exists.
#[derive(Debug, Clone)]
pub struct TaskDetail {
    pub task: Task,
    pub category: Option<Category>,
}

/// ## Summary
/// Lists the tasks visible to the principal: administrators see every task,
/// everyone else only their own.
///
/// ## Errors
/// Returns an error if the principal may not list tasks or the query fails.
pub async fn list_tasks(
    conn: &mut DbConnection<'_>,
    engine: &AuthzEngine,
    claims: Claims,
) -> ServiceResult<Vec<TaskDetail>> {
    engine.require(claims, ResourceKind::Task, Action::List, None)?;

    let mut query = schema::tasks::table
        .left_join(schema::categories::table)
        .select((Task::as_select(), Option::<Category>::as_select()))
        .order(schema::tasks::id.asc())
        .into_boxed();

    if let ListScope::Owner(owner_id) = engine.list_scope(claims, ResourceKind::Task) {
        query = query.filter(schema::tasks::user_id.eq(owner_id));
    }

    let rows: Vec<(Task, Option<Category>)> = query.load(conn).await?;

    Ok(rows
        .into_iter()
        .map(|(task, category)| TaskDetail { task, category })
        .collect())
}

/// ## Summary
/// Fetches a single task with its category.
///
/// ## Errors
/// - `NotFound` if the id does not resolve, checked before ownership.
/// - `AuthorizationError` if the task exists but belongs to someone else.
pub async fn get_task(
    conn: &mut DbConnection<'_>,
    engine: &AuthzEngine,
    claims: Claims,
    task_id: i32,
) -> ServiceResult<TaskDetail> {
    let row: Option<(Task, Option<Category>)> = schema::tasks::table
        .left_join(schema::categories::table)
        .filter(schema::tasks::id.eq(task_id))
        .select((Task::as_select(), Option::<Category>::as_select()))
        .first(conn)
        .await
        .optional()?;

    let Some((task, category)) = row else {
        return Err(ServiceError::NotFound("Task not found".to_string()));
    };

    engine.require(claims, ResourceKind::Task, Action::Read, Some(task.user_id))?;

    Ok(TaskDetail { task, category })
}

/// ## Summary
/// Creates a task owned by the authenticated principal.
///
/// The owner always comes from the verified claims; client-supplied owner
/// fields never reach this function.
///
/// ## Side Effects
/// - Inserts the task row.
///
/// ## Errors
/// - `ValidationError` if the title is empty.
/// - `NotFound` if the category, or the owning principal itself, does not
///   resolve.
pub async fn create_task(
    conn: &mut DbConnection<'_>,
    engine: &AuthzEngine,
    claims: Claims,
    ctx: &CreateTaskContext,
) -> ServiceResult<TaskDetail> {
    engine.require(claims, ResourceKind::Task, Action::Create, None)?;

    if ctx.title.trim().is_empty() {
        return Err(ServiceError::ValidationError(
            "title must not be empty".to_string(),
        ));
    }

    // A verified token can outlive its principal row.
    let owner: Option<User> = query::user::by_id(claims.principal_id)
        .select(User::as_select())
        .first(conn)
        .await
        .optional()?;
    if owner.is_none() {
        return Err(ServiceError::NotFound("User not found".to_string()));
    }

    let category: Option<Category> = query::category::by_id(ctx.category_id)
        .select(Category::as_select())
        .first(conn)
        .await
        .optional()?;
    let Some(category) = category else {
        return Err(ServiceError::NotFound("Category not found".to_string()));
    };

    let new_task = NewTask {
        title: &ctx.title,
        description: ctx.description.as_deref(),
        due_date: ctx.due_date.as_deref(),
        user_id: claims.principal_id,
        category_id: category.id,
    };

    let task: Task = diesel::insert_into(schema::tasks::table)
        .values(&new_task)
        .returning(Task::as_returning())
        .get_result(conn)
        .await?;

    tracing::info!(task_id = task.id, owner_id = task.user_id, "Task created");

    Ok(TaskDetail {
        task,
        category: Some(category),
    })
}

/// ## Summary
/// Applies a partial update to a task. Only fields present in the context
/// are written; an update carrying no fields is a no-op returning current
/// state.
///
/// ## Errors
/// - `NotFound` if the task, or a newly referenced category, does not
///   resolve.
/// - `AuthorizationError` if the task belongs to someone else.
/// - `ValidationError` if a supplied title is empty.
pub async fn update_task(
    conn: &mut DbConnection<'_>,
    engine: &AuthzEngine,
    claims: Claims,
    task_id: i32,
    ctx: &UpdateTaskContext,
) -> ServiceResult<TaskDetail> {
    let task: Option<Task> = query::task::by_id(task_id)
        .select(Task::as_select())
        .first(conn)
        .await
        .optional()?;
    let Some(task) = task else {
        return Err(ServiceError::NotFound("Task not found".to_string()));
    };

    engine.require(claims, ResourceKind::Task, Action::Update, Some(task.user_id))?;

    if let Some(title) = &ctx.title {
        if title.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "title must not be empty".to_string(),
            ));
        }
    }

    if let Some(category_id) = ctx.category_id {
        let category: Option<Category> = query::category::by_id(category_id)
            .select(Category::as_select())
            .first(conn)
            .await
            .optional()?;
        if category.is_none() {
            return Err(ServiceError::NotFound("Category not found".to_string()));
        }
    }

    let changeset = TaskChangeset {
        title: ctx.title.clone(),
        description: ctx.description.clone(),
        due_date: ctx.due_date.clone(),
        completed: ctx.completed,
        category_id: ctx.category_id,
    };

    if !changeset.is_empty() {
        diesel::update(schema::tasks::table.filter(schema::tasks::id.eq(task_id)))
            .set(&changeset)
            .execute(conn)
            .await?;

        tracing::debug!(task_id, "Task updated");
    }

    get_task(conn, engine, claims, task_id).await
}

/// ## Summary
/// Deletes a task.
///
/// ## Errors
/// - `NotFound` if the id does not resolve, checked before ownership.
/// - `AuthorizationError` if the task belongs to someone else.
pub async fn delete_task(
    conn: &mut DbConnection<'_>,
    engine: &AuthzEngine,
    claims: Claims,
    task_id: i32,
) -> ServiceResult<()> {
    let task: Option<Task> = query::task::by_id(task_id)
        .select(Task::as_select())
        .first(conn)
        .await
        .optional()?;
    let Some(task) = task else {
        return Err(ServiceError::NotFound("Task not found".to_string()));
    };

    engine.require(claims, ResourceKind::Task, Action::Delete, Some(task.user_id))?;

    diesel::delete(schema::tasks::table.filter(schema::tasks::id.eq(task_id)))
        .execute(conn)
        .await?;

    tracing::info!(task_id, "Task deleted");

    Ok(())
}
