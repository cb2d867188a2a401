use diesel::{prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};

use crate::db::schema;

#[derive(
    Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = schema::tasks)]
#[diesel(check_for_backend(Sqlite))]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    /// Free-form text; the store does not interpret it.
    pub due_date: Option<String>,
    pub completed: bool,
    pub user_id: i32,
    pub category_id: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::tasks)]
pub struct NewTask<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub due_date: Option<&'a str>,
    pub user_id: i32,
    pub category_id: i32,
}

/// Partial update; `None` fields are left untouched. The owner column is
/// deliberately absent, ownership never changes after creation.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = schema::tasks)]
pub struct TaskChangeset {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub completed: Option<bool>,
    pub category_id: Option<i32>,
}

impl TaskChangeset {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.completed.is_none()
            && self.category_id.is_none()
    }
}
