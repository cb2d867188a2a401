pub mod category;
pub mod task;
pub mod user;
