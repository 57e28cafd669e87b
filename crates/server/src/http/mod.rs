use axum::{Router, middleware::from_fn_with_state, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{AppState, routes};

pub mod auth;

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(routes::users::protected_router())
        .merge(routes::tasks::router(&state))
        .merge(routes::calendar_settings::router(&state))
        .layer(from_fn_with_state(state.clone(), auth::require_auth));

    let api_routes = Router::new()
        .merge(routes::users::public_router())
        .merge(protected);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
