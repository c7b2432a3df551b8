use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};

use crate::{
    dto::tool_dto::{TopicPayload, TopicResponse},
    error::{Error, Result},
    services::topic_service::TopicRecord,
    AppState,
};

#[axum::debug_handler]
pub async fn list_topics(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(state.topic_source.list_topics().await))
}

#[axum::debug_handler]
pub async fn add_topic(
    State(state): State<AppState>,
    Json(payload): Json<TopicPayload>,
) -> Result<impl IntoResponse> {
    let topic = payload
        .interest
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::BadRequest("Interest is required".to_string()))?
        .to_string();

    let recorded = state.topic_source.record_topic(&topic).await?;

    let (status, message) = match recorded.outcome {
        TopicRecord::Inserted => (StatusCode::CREATED, "Topic added"),
        TopicRecord::Incremented => (StatusCode::OK, "Topic frequency incremented"),
    };
    Ok((
        status,
        Json(TopicResponse {
            message: message.to_string(),
            topic,
            freq: recorded.freq,
        }),
    ))
}
