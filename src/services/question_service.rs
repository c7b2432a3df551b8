use crate::error::Result;
use crate::models::question::{Difficulty, Question, StoredQuestion};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

pub const QUESTION_LIFETIME_HOURS: i64 = 24;

/// Authoritative question storage, keyed by qid.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn save(
        &self,
        qid: &str,
        question: &Question,
        topic: Option<&str>,
        difficulty: Option<Difficulty>,
    ) -> Result<()>;

    /// Expired questions are reported as absent.
    async fn get(&self, qid: &str) -> Result<Option<StoredQuestion>>;
}

#[derive(Clone)]
pub struct QuestionService {
    pool: PgPool,
}

impl QuestionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM questions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl QuestionStore for QuestionService {
    async fn save(
        &self,
        qid: &str,
        question: &Question,
        topic: Option<&str>,
        difficulty: Option<Difficulty>,
    ) -> Result<()> {
        let expires_at = Utc::now() + Duration::hours(QUESTION_LIFETIME_HOURS);
        sqlx::query(
            r#"
            INSERT INTO questions (qid, data, topic, difficulty, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(qid)
        .bind(Json(question))
        .bind(topic)
        .bind(difficulty.map(|d| d.as_str()))
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        tracing::info!(qid, qname = %question.qname, "Question saved");
        Ok(())
    }

    async fn get(&self, qid: &str) -> Result<Option<StoredQuestion>> {
        let question = sqlx::query_as::<_, StoredQuestion>(
            r#"
            SELECT id, qid, data, topic, difficulty, created_at, expires_at
            FROM questions
            WHERE qid = $1 AND expires_at > NOW()
            "#,
        )
        .bind(qid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(question)
    }
}
