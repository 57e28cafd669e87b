pub mod calendar_settings;
pub mod health;
pub mod tasks;
pub mod users;
