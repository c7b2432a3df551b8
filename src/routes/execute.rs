use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{dto::tool_dto::ExecutePayload, error::Result, AppState};

#[axum::debug_handler]
pub async fn execute_code(
    State(state): State<AppState>,
    Json(payload): Json<ExecutePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let result = state
        .execution_service
        .execute(&payload.language, &payload.source_code)
        .await?;
    Ok(Json(result))
}
