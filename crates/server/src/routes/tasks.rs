use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{delete, get, put},
};
use chrono::Utc;
use db::models::{
    task::{CreateTask, Task, UpdateTask},
    user::User,
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::load_task_middleware};

pub async fn get_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<ResponseJson<Vec<Task>>, ApiError> {
    let tasks = Task::find_all_for_user(&state.db().conn, user.id).await?;
    Ok(Json(tasks))
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateTask>,
) -> Result<(StatusCode, ResponseJson<Task>), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }

    let task = Task::create(&state.db().conn, user.id, &payload, Uuid::new_v4()).await?;
    tracing::debug!(task_id = %task.id, user_id = %user.id, "created task");
    Ok((StatusCode::CREATED, Json(task)))
}

/// The recommendation runs over the user's open tasks; an empty result is a
/// 404, not an error.
pub async fn get_next_task(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<ResponseJson<Task>, ApiError> {
    let next = Task::find_next_for_user(&state.db().conn, user.id, Utc::now()).await?;
    next.map(Json)
        .ok_or_else(|| ApiError::NotFound("No tasks found".to_string()))
}

pub async fn get_task(Extension(task): Extension<Task>) -> ResponseJson<Task> {
    Json(task)
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Extension(task): Extension<Task>,
    Json(payload): Json<UpdateTask>,
) -> Result<ResponseJson<Task>, ApiError> {
    let updated = Task::update(&state.db().conn, task.id, user.id, &payload).await?;
    Ok(Json(updated))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Extension(task): Extension<Task>,
) -> Result<ResponseJson<Value>, ApiError> {
    let rows = Task::delete(&state.db().conn, task.id, user.id).await?;
    if rows == 0 {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }
    Ok(Json(json!({ "message": "Task removed" })))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let task_id_router = Router::new()
        .route("/", get(get_task))
        .route("/", put(update_task))
        .route("/", delete(delete_task))
        .layer(from_fn_with_state(state.clone(), load_task_middleware));

    let inner = Router::new()
        .route("/", get(get_tasks).post(create_task))
        .route("/next", get(get_next_task))
        .nest("/{task_id}", task_id_router);

    Router::new().nest("/tasks", inner)
}
