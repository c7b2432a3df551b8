use crate::error::{Error, Result};
use crate::models::saved_question::SavedQuestion;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    AlreadySaved,
}

#[derive(Clone)]
pub struct SavedQuestionService {
    pool: PgPool,
}

impl SavedQuestionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn save(
        &self,
        user_id: &str,
        question_id: &str,
        question_data: &JsonValue,
    ) -> Result<SaveOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO saved_questions (user_id, question_id, question_data)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, question_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(question_id)
        .bind(question_data)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(SaveOutcome::AlreadySaved);
        }
        tracing::info!(user_id, question_id, "Question bookmarked");
        Ok(SaveOutcome::Saved)
    }

    /// Newest first.
    pub async fn list(&self, user_id: &str) -> Result<Vec<SavedQuestion>> {
        let saved = sqlx::query_as::<_, SavedQuestion>(
            r#"
            SELECT id, user_id, question_id, question_data, saved_at
            FROM saved_questions
            WHERE user_id = $1
            ORDER BY saved_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(saved)
    }

    pub async fn remove(&self, user_id: &str, question_id: &str) -> Result<()> {
        let result =
            sqlx::query("DELETE FROM saved_questions WHERE user_id = $1 AND question_id = $2")
                .bind(user_id)
                .bind(question_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Saved question not found".to_string()));
        }
        tracing::info!(user_id, question_id, "Bookmark removed");
        Ok(())
    }

    pub async fn is_bookmarked(&self, user_id: &str, question_id: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM saved_questions WHERE user_id = $1 AND question_id = $2)",
        )
        .bind(user_id)
        .bind(question_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
