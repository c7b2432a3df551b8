use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::user_service::ProfileUpdate;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    #[validate(length(min = 1, max = 64))]
    pub level: Option<String>,
    pub interests: Option<Vec<String>>,
    pub preferred_languages: Option<Vec<String>>,
}

impl From<UpdateProfilePayload> for ProfileUpdate {
    fn from(payload: UpdateProfilePayload) -> Self {
        Self {
            level: payload.level,
            interests: payload.interests,
            preferred_languages: payload.preferred_languages,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginPayload {
    #[serde(default)]
    #[validate(length(min = 1, max = 64, message = "Username is required"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub token: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifyTokenPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub message: String,
}
