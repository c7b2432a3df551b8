use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub level: String,
    pub interests: Vec<String>,
    pub preferred_languages: Vec<String>,
    pub timezone: String,
    pub image_url: Option<String>,
    pub total_questions: i32,
    pub solved_questions: i32,
    pub streak: i32,
    pub average_time_per_question: f64,
    pub weak_topics: Vec<String>,
    pub strong_topics: Vec<String>,
    pub last_active: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identity used for the single-tenant flows when no bearer token is presented.
pub const DEFAULT_USER: &str = "default_user";

pub fn default_email(username: &str) -> String {
    format!("{}@codesensei.local", username)
}
