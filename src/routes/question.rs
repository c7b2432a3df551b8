use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::question_dto::{
        GenerateQuestionPayload, QuestionQuery, QuestionResponse, StoreQuestionPayload,
    },
    error::{Error, Result},
    models::question::{Difficulty, Question},
    services::question_service::QuestionStore,
    AppState,
};

#[axum::debug_handler]
pub async fn generate_question(
    State(state): State<AppState>,
    payload: Option<Json<GenerateQuestionPayload>>,
) -> Result<impl IntoResponse> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    if let Some(topic) = payload.topic.as_deref() {
        if topic.trim().is_empty() {
            return Err(Error::BadRequest("Topic must not be empty".to_string()));
        }
    }
    let difficulty = payload
        .difficulty
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .map(str::parse::<Difficulty>)
        .transpose()
        .map_err(Error::BadRequest)?;

    let next = state
        .generation_service
        .get_next_question(payload.topic.as_deref(), difficulty)
        .await;
    Ok(Json(next))
}

#[axum::debug_handler]
pub async fn get_question(
    State(state): State<AppState>,
    Query(query): Query<QuestionQuery>,
) -> Result<impl IntoResponse> {
    query.validate()?;
    let stored = state
        .question_service
        .get(&query.qid)
        .await?
        .ok_or_else(|| Error::NotFound("Question not found".to_string()))?;
    Ok(Json(QuestionResponse::from(stored)))
}

/// Stores a question produced elsewhere (e.g. by the client) under its qid.
#[axum::debug_handler]
pub async fn store_question(
    State(state): State<AppState>,
    Json(payload): Json<StoreQuestionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    if payload.question_data.is_null() {
        return Err(Error::BadRequest("Question ID and data are required".to_string()));
    }
    let question: Question = serde_json::from_value(payload.question_data)?;
    if !question.is_complete() {
        return Err(Error::BadRequest(
            "Question must include qname and description".to_string(),
        ));
    }

    state
        .question_service
        .save(&payload.qid, &question, None, None)
        .await
        .map_err(|e| match e {
            Error::Conflict(_) => Error::Conflict("Question ID already exists".to_string()),
            other => other,
        })?;
    Ok(Json(json!({ "success": true, "qid": payload.qid })))
}
