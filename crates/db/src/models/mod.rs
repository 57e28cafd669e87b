pub mod calendar_setting;
pub mod task;
pub mod user;
