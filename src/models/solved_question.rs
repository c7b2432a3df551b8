use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SolvedQuestion {
    pub id: Uuid,
    pub user_id: String,
    pub question_id: String,
    pub solved_at: DateTime<Utc>,
}
