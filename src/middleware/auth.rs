use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::{models::user::DEFAULT_USER, AppState};

/// Username the request acts as, inserted by [`resolve_user`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

fn unauthorized(reason: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": reason }))).into_response()
}

/// A valid bearer token selects its subject; no `Authorization` header falls
/// back to the shared default user. A present but unusable header is rejected.
pub async fn resolve_user(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let username = match req.headers().get(AUTHORIZATION) {
        None => DEFAULT_USER.to_string(),
        Some(header) => {
            let Ok(auth_str) = header.to_str() else {
                return unauthorized("bad_authorization");
            };
            let Some(token) = auth_str.strip_prefix("Bearer ") else {
                return unauthorized("unsupported_scheme");
            };
            match state.auth_service.verify(token.trim()) {
                Ok(username) => username,
                Err(_) => return unauthorized("invalid_token"),
            }
        }
    };

    req.extensions_mut().insert(CurrentUser(username));
    next.run(req).await
}
