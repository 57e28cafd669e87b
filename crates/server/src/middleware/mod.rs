mod model_loaders;

pub use model_loaders::{load_calendar_setting_middleware, load_task_middleware};
