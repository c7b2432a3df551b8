use axum::{
    extract::{Extension, Query, State},
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::progress_dto::{MarkSolvedResponse, QuestionIdPayload, QuestionIdQuery},
    error::Result,
    middleware::auth::CurrentUser,
    AppState,
};

#[axum::debug_handler]
pub async fn mark_solved(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<QuestionIdPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let already_solved = state
        .solved_question_service
        .mark_solved(&user, &payload.question_id)
        .await?;
    Ok(Json(MarkSolvedResponse::new(already_solved)))
}

#[axum::debug_handler]
pub async fn solved_status(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<QuestionIdQuery>,
) -> Result<impl IntoResponse> {
    query.validate()?;
    let status = state
        .solved_question_service
        .status(&user, &query.question_id)
        .await?;
    Ok(Json(status))
}
