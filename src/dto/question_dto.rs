use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::Validate;

use crate::models::question::{Question, StoredQuestion};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateQuestionPayload {
    pub topic: Option<String>,
    pub difficulty: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuestionQuery {
    #[serde(default)]
    #[validate(length(min = 1, message = "Question ID is required"))]
    pub qid: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StoreQuestionPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "Question ID is required"))]
    pub qid: String,
    #[serde(default)]
    pub question_data: JsonValue,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionResponse {
    pub qid: String,
    #[serde(flatten)]
    pub question: Question,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

impl From<StoredQuestion> for QuestionResponse {
    fn from(stored: StoredQuestion) -> Self {
        Self {
            qid: stored.qid,
            question: stored.data.0,
            topic: stored.topic,
            difficulty: stored.difficulty,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAnswerPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "Question ID is required"))]
    pub question_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Language is required"))]
    pub language: String,
    #[serde(default)]
    pub force_regenerate: bool,
}
