use diesel::{prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};

use crate::db::schema;

#[derive(
    Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = schema::categories)]
#[diesel(check_for_backend(Sqlite))]
pub struct Category {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::categories)]
pub struct NewCategory<'a> {
    pub name: &'a str,
}
