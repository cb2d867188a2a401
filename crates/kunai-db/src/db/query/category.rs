//! Query builder functions for categories.

use diesel::prelude::*;

use crate::db::schema::categories;

/// ## Summary
/// Returns a query to select all categories in id order.
#[must_use]
pub fn all() -> categories::BoxedQuery<'static, diesel::sqlite::Sqlite> {
    categories::table.order(categories::id.asc()).into_boxed()
}

/// ## Summary
/// Returns a query to find a category by ID.
#[must_use]
pub fn by_id(id: i32) -> categories::BoxedQuery<'static, diesel::sqlite::Sqlite> {
    all().filter(categories::id.eq(id))
}
