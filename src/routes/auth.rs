use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::user_dto::{LoginPayload, TokenResponse, VerifyTokenPayload},
    error::Result,
    services::auth_service::LoginOutcome,
    AppState,
};

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let outcome = state
        .auth_service
        .login(payload.username.trim(), &payload.password)
        .await?;

    Ok(match outcome {
        LoginOutcome::Created { token } => (
            StatusCode::CREATED,
            Json(TokenResponse {
                message: Some("User created".to_string()),
                token,
            }),
        ),
        LoginOutcome::LoggedIn { token } => (
            StatusCode::OK,
            Json(TokenResponse {
                message: None,
                token,
            }),
        ),
    })
}

#[axum::debug_handler]
pub async fn verify_token(
    State(state): State<AppState>,
    Json(payload): Json<VerifyTokenPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let username = state.auth_service.verify(&payload.token)?;
    Ok(Json(json!({ "username": username })))
}
