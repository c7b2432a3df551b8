use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Topic {
    pub id: Uuid,
    pub topic: String,
    pub freq: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
