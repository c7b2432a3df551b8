use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExecutePayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "Language is required"))]
    pub language: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Source code is required"))]
    pub source_code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopicPayload {
    pub interest: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopicResponse {
    pub message: String,
    pub topic: String,
    pub freq: i32,
}
