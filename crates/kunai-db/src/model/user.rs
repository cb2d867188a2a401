use diesel::{prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};

use crate::db::schema;

// Re-export Role for public API
pub use crate::db::enums::Role;

#[derive(
    Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = schema::users)]
#[diesel(check_for_backend(Sqlite))]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    /// Argon2 digest. Never leaves the process in serialized form.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub registered_on: chrono::NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::users)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = schema::users)]
pub struct UserChangeset {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl UserChangeset {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.password_hash.is_none()
    }
}
