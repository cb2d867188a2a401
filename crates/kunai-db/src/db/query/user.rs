//! Query builder functions for users.

use diesel::prelude::*;

use crate::db::schema::users;

/// ## Summary
/// Returns a query to select all users in id order.
#[must_use]
pub fn all() -> users::BoxedQuery<'static, diesel::sqlite::Sqlite> {
    users::table.order(users::id.asc()).into_boxed()
}

/// ## Summary
/// Returns a query to find a user by ID.
#[must_use]
pub fn by_id(id: i32) -> users::BoxedQuery<'static, diesel::sqlite::Sqlite> {
    all().filter(users::id.eq(id))
}

/// ## Summary
/// Returns a query to find a user by username.
#[must_use]
pub fn by_username(username: &str) -> users::BoxedQuery<'_, diesel::sqlite::Sqlite> {
    all().filter(users::username.eq(username))
}

/// ## Summary
/// Returns a query to find users matching a username or an email address.
#[must_use]
pub fn by_username_or_email<'a>(
    username: &'a str,
    email: &'a str,
) -> users::BoxedQuery<'a, diesel::sqlite::Sqlite> {
    all().filter(users::username.eq(username).or(users::email.eq(email)))
}
