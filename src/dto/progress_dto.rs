use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::Validate;

use crate::models::saved_question::SavedQuestion;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuestionIdPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "Question ID is required"))]
    pub question_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuestionIdQuery {
    #[serde(default)]
    #[validate(length(min = 1, message = "Question ID is required"))]
    pub question_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveQuestionPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "Question ID is required"))]
    pub question_id: String,
    #[serde(default)]
    pub question_data: JsonValue,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedQuestionList {
    pub saved_questions: Vec<SavedQuestion>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkStatus {
    pub is_bookmarked: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkSolvedResponse {
    pub success: bool,
    pub message: String,
    pub already_solved: bool,
}

impl MarkSolvedResponse {
    pub fn new(already_solved: bool) -> Self {
        let message = if already_solved {
            "Question already marked as solved"
        } else {
            "Question marked as solved"
        };
        Self {
            success: true,
            message: message.to_string(),
            already_solved,
        }
    }
}
