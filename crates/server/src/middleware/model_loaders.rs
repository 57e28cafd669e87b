use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use db::models::{calendar_setting::CalendarSetting, task::Task, user::User};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Owner-scoped loaders: a resource belonging to another user is
/// indistinguishable from a missing one.
fn current_user(request: &Request) -> Result<User, ApiError> {
    request
        .extensions()
        .get::<User>()
        .cloned()
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
}

pub async fn load_task_middleware(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = current_user(&request)?;
    let task = Task::find_by_id_for_user(&state.db().conn, task_id, user.id)
        .await?
        .ok_or_else(|| {
            tracing::warn!(%task_id, user_id = %user.id, "task not found");
            ApiError::NotFound("Task not found".to_string())
        })?;
    request.extensions_mut().insert(task);
    Ok(next.run(request).await)
}

pub async fn load_calendar_setting_middleware(
    State(state): State<AppState>,
    Path(setting_id): Path<Uuid>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = current_user(&request)?;
    let setting = CalendarSetting::find_by_id_for_user(&state.db().conn, setting_id, user.id)
        .await?
        .ok_or_else(|| {
            tracing::warn!(%setting_id, user_id = %user.id, "calendar setting not found");
            ApiError::NotFound("Calendar setting not found".to_string())
        })?;
    request.extensions_mut().insert(setting);
    Ok(next.run(request).await)
}
