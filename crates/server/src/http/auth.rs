use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use db::models::user::User;
use serde_json::json;

use crate::AppState;

pub fn parse_authorization_bearer(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    let (prefix, rest) = trimmed.split_once(' ')?;
    if !prefix.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": message }))).into_response()
}

/// Verifies the bearer token, loads the user row, and makes it available to
/// handlers as a request extension.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_authorization_bearer);

    let Some(token) = token else {
        return unauthorized("Authentication required");
    };

    let user_id = match state.jwt().verify_token(token) {
        Ok(user_id) => user_id,
        Err(err) => {
            tracing::debug!("rejected bearer token: {err}");
            return unauthorized("Invalid or expired token");
        }
    };

    let user = match User::find_by_id(&state.db().conn, user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            // Token is valid but the account no longer exists.
            tracing::warn!(%user_id, "token presented for unknown user");
            return unauthorized("Invalid or expired token");
        }
        Err(err) => {
            tracing::error!("failed to load authenticated user: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Internal server error" })),
            )
                .into_response();
        }
    };

    req.extensions_mut().insert(user);
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::parse_authorization_bearer;

    #[test]
    fn accepts_standard_bearer_header() {
        assert_eq!(parse_authorization_bearer("Bearer abc123"), Some("abc123"));
    }

    #[test]
    fn scheme_is_case_insensitive_and_whitespace_tolerant() {
        assert_eq!(
            parse_authorization_bearer("  bearer   abc123  "),
            Some("abc123")
        );
    }

    #[test]
    fn rejects_other_schemes_and_empty_tokens() {
        assert_eq!(parse_authorization_bearer("Basic abc123"), None);
        assert_eq!(parse_authorization_bearer("Bearer "), None);
        assert_eq!(parse_authorization_bearer("abc123"), None);
    }
}
