use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SavedQuestion {
    pub id: Uuid,
    pub user_id: String,
    pub question_id: String,
    pub question_data: JsonValue,
    pub saved_at: DateTime<Utc>,
}
