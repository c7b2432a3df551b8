use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::progress_dto::{
        BookmarkStatus, QuestionIdPayload, QuestionIdQuery, SaveQuestionPayload,
        SavedQuestionList,
    },
    error::{Error, Result},
    middleware::auth::CurrentUser,
    services::saved_question_service::SaveOutcome,
    AppState,
};

#[axum::debug_handler]
pub async fn save_question(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<SaveQuestionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    if payload.question_data.is_null() {
        return Err(Error::BadRequest(
            "Question ID and question data are required".to_string(),
        ));
    }

    let outcome = state
        .saved_question_service
        .save(&user, &payload.question_id, &payload.question_data)
        .await?;

    Ok(match outcome {
        SaveOutcome::Saved => (StatusCode::CREATED, Json(json!({ "success": true }))),
        SaveOutcome::AlreadySaved => (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "Question already saved" })),
        ),
    })
}

#[axum::debug_handler]
pub async fn list_saved_questions(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<impl IntoResponse> {
    let saved_questions = state.saved_question_service.list(&user).await?;
    Ok(Json(SavedQuestionList { saved_questions }))
}

#[axum::debug_handler]
pub async fn remove_saved_question(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<QuestionIdPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state
        .saved_question_service
        .remove(&user, &payload.question_id)
        .await?;
    Ok(Json(json!({ "success": true })))
}

#[axum::debug_handler]
pub async fn check_saved_question(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<QuestionIdQuery>,
) -> Result<impl IntoResponse> {
    query.validate()?;
    let is_bookmarked = state
        .saved_question_service
        .is_bookmarked(&user, &query.question_id)
        .await?;
    Ok(Json(BookmarkStatus { is_bookmarked }))
}
