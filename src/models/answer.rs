use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Structured sections of a model-written solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedAnswer {
    pub approach: String,
    pub solution: String,
    pub time_complexity: String,
    pub space_complexity: String,
    pub explanation: String,
    pub edge_cases: String,
    pub alternative_approaches: String,
    pub raw_response: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct AnswerRecord {
    pub id: Uuid,
    pub question_id: String,
    pub language: String,
    pub user_id: String,
    pub answer: Json<GeneratedAnswer>,
    pub generated_at: DateTime<Utc>,
    pub is_regenerated: bool,
}
