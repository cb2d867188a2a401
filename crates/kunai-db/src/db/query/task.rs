//! Query builder functions for tasks.

use diesel::prelude::*;

use crate::db::schema::tasks;

/// ## Summary
/// Returns a query to select all tasks in id order.
#[must_use]
pub fn all() -> tasks::BoxedQuery<'static, diesel::sqlite::Sqlite> {
    tasks::table.order(tasks::id.asc()).into_boxed()
}

/// ## Summary
/// Returns a query to find a task by ID.
#[must_use]
pub fn by_id(id: i32) -> tasks::BoxedQuery<'static, diesel::sqlite::Sqlite> {
    all().filter(tasks::id.eq(id))
}

/// ## Summary
/// Returns a query to find all tasks owned by a user.
#[must_use]
pub fn by_owner(owner_id: i32) -> tasks::BoxedQuery<'static, diesel::sqlite::Sqlite> {
    all().filter(tasks::user_id.eq(owner_id))
}
