use crate::error::Result;
use crate::models::solved_question::SolvedQuestion;
use crate::models::user::default_email;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolvedStatus {
    pub is_solved: bool,
    pub solved_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct SolvedQuestionService {
    pool: PgPool,
}

impl SolvedQuestionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns `true` when the question had already been marked. The legacy
    /// per-user counter only moves when a new row is inserted.
    pub async fn mark_solved(&self, user_id: &str, question_id: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO solved_questions (user_id, question_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, question_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(question_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        if inserted {
            sqlx::query(
                r#"
                INSERT INTO users (username, email, solved_questions)
                VALUES ($1, $2, 1)
                ON CONFLICT (username)
                DO UPDATE SET solved_questions = users.solved_questions + 1,
                              last_active = NOW(),
                              updated_at = NOW()
                "#,
            )
            .bind(user_id)
            .bind(default_email(user_id))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        if inserted {
            tracing::info!(user_id, question_id, "Question marked as solved");
        }
        Ok(!inserted)
    }

    pub async fn status(&self, user_id: &str, question_id: &str) -> Result<SolvedStatus> {
        let solved = sqlx::query_as::<_, SolvedQuestion>(
            r#"
            SELECT id, user_id, question_id, solved_at
            FROM solved_questions
            WHERE user_id = $1 AND question_id = $2
            "#,
        )
        .bind(user_id)
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(SolvedStatus::from(solved))
    }
}

impl From<Option<SolvedQuestion>> for SolvedStatus {
    fn from(solved: Option<SolvedQuestion>) -> Self {
        Self {
            is_solved: solved.is_some(),
            solved_at: solved.map(|s| s.solved_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_for_the_client() {
        let value = serde_json::to_value(SolvedStatus::from(None)).unwrap();
        assert_eq!(value["isSolved"], false);
        assert!(value["solvedAt"].is_null());

        let solved = SolvedQuestion {
            id: uuid::Uuid::new_v4(),
            user_id: "ada".into(),
            question_id: "q1".into(),
            solved_at: Utc::now(),
        };
        let value = serde_json::to_value(SolvedStatus::from(Some(solved))).unwrap();
        assert_eq!(value["isSolved"], true);
        assert!(value["solvedAt"].is_string());
    }
}
