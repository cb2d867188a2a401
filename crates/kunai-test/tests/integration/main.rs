mod accounts;
mod categories;
mod tokens;
mod users;
