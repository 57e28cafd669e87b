use axum::{
    Extension, Json, Router,
    extract::State,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{delete, get},
};
use db::models::{
    calendar_setting::{CalendarSetting, UpsertCalendarSetting},
    user::User,
};
use serde_json::{Value, json};

use crate::{AppState, error::ApiError, middleware::load_calendar_setting_middleware};

pub async fn get_calendar_settings(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<ResponseJson<Vec<CalendarSetting>>, ApiError> {
    let settings = CalendarSetting::find_all_for_user(&state.db().conn, user.id).await?;
    Ok(Json(settings))
}

/// POST is an upsert keyed on (user, calendar id).
pub async fn upsert_calendar_setting(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<UpsertCalendarSetting>,
) -> Result<ResponseJson<CalendarSetting>, ApiError> {
    if payload.calendar_id.trim().is_empty() {
        return Err(ApiError::BadRequest("Calendar id is required".to_string()));
    }

    let setting = CalendarSetting::upsert(&state.db().conn, user.id, &payload).await?;
    Ok(Json(setting))
}

pub async fn delete_calendar_setting(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Extension(setting): Extension<CalendarSetting>,
) -> Result<ResponseJson<Value>, ApiError> {
    let rows = CalendarSetting::delete(&state.db().conn, setting.id, user.id).await?;
    if rows == 0 {
        return Err(ApiError::NotFound(
            "Calendar setting not found".to_string(),
        ));
    }
    Ok(Json(json!({ "message": "Calendar setting removed" })))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let setting_id_router = Router::new()
        .route("/", delete(delete_calendar_setting))
        .layer(from_fn_with_state(
            state.clone(),
            load_calendar_setting_middleware,
        ));

    let inner = Router::new()
        .route("/", get(get_calendar_settings).post(upsert_calendar_setting))
        .nest("/{setting_id}", setting_id_router);

    Router::new().nest("/calendar-settings", inner)
}
