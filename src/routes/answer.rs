use axum::{
    extract::{Extension, State},
    response::{IntoResponse, Json},
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::question_dto::GenerateAnswerPayload, error::Result, middleware::auth::CurrentUser,
    AppState,
};

#[axum::debug_handler]
pub async fn generate_answer(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<GenerateAnswerPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let outcome = state
        .answer_service
        .generate_answer(
            payload.question_id.trim(),
            payload.language.trim(),
            &user,
            payload.force_regenerate,
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "answer": outcome.answer,
        "cached": outcome.cached,
    })))
}
