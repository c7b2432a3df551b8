use crate::error::{Error, Result};
use crate::models::user::{default_email, User};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

const DEFAULT_WEAK_TOPICS: &[&str] = &["Dynamic Programming", "Graphs"];
const DEFAULT_STRONG_TOPICS: &[&str] = &["Arrays", "Strings", "Sorting"];
const RECENT_ACTIVITY_DAYS: i32 = 7;

const USER_COLUMNS: &str = "id, username, email, password_hash, level, interests, \
    preferred_languages, timezone, image_url, total_questions, solved_questions, streak, \
    average_time_per_question, weak_topics, strong_topics, last_active, created_at, updated_at";

/// Counts derived from the progress tables rather than the stored counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressCounts {
    pub solved: i64,
    pub saved: i64,
    pub recent: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    pub level: String,
    pub total_questions: i64,
    pub solved_questions: i64,
    pub saved_questions: i64,
    pub streak: i32,
    pub average_time: f64,
    pub weak_topics: Vec<String>,
    pub strong_topics: Vec<String>,
    pub join_date: DateTime<Utc>,
    pub interests: Vec<String>,
    pub preferred_languages: Vec<String>,
    pub completion_rate: i64,
    pub recent_activity: i64,
    pub last_active: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl UserProfile {
    pub fn build(user: User, counts: ProgressCounts) -> Self {
        let total = i64::from(user.total_questions).max(counts.solved);
        let completion_rate = if total > 0 {
            ((counts.solved as f64 / total as f64) * 100.0).round() as i64
        } else {
            0
        };

        Self {
            username: user.username,
            level: user.level,
            total_questions: total,
            solved_questions: counts.solved,
            saved_questions: counts.saved,
            streak: user.streak,
            average_time: user.average_time_per_question,
            weak_topics: or_defaults(user.weak_topics, DEFAULT_WEAK_TOPICS),
            strong_topics: or_defaults(user.strong_topics, DEFAULT_STRONG_TOPICS),
            join_date: user.created_at,
            interests: user.interests,
            preferred_languages: user.preferred_languages,
            completion_rate,
            recent_activity: counts.recent,
            last_active: user.last_active,
            image_url: user.image_url,
        }
    }
}

fn or_defaults(values: Vec<String>, defaults: &[&str]) -> Vec<String> {
    if values.is_empty() {
        defaults.iter().map(|s| s.to_string()).collect()
    } else {
        values
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub level: Option<String>,
    pub interests: Option<Vec<String>>,
    pub preferred_languages: Option<Vec<String>>,
}

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Creates the row with default profile values when it does not exist yet.
    pub async fn ensure(&self, username: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email)
            VALUES ($1, $2)
            ON CONFLICT (username) DO UPDATE SET username = EXCLUDED.username
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(username)
        .bind(default_email(username))
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn create_with_password(&self, username: &str, password_hash: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(username)
        .bind(default_email(username))
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(username, "User created");
        Ok(user)
    }

    /// Sets the hash only when none is stored; returns whether it was written.
    pub async fn adopt_password(&self, username: &str, password_hash: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users SET password_hash = $2, updated_at = NOW()
            WHERE username = $1 AND password_hash IS NULL
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn touch_last_active(&self, username: &str) -> Result<()> {
        sqlx::query("UPDATE users SET last_active = NOW() WHERE username = $1")
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_profile(&self, username: &str) -> Result<UserProfile> {
        let user = self.ensure(username).await?;
        let counts = self.progress_counts(username).await?;
        Ok(UserProfile::build(user, counts))
    }

    async fn progress_counts(&self, username: &str) -> Result<ProgressCounts> {
        let (solved, saved, recent): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM solved_questions WHERE user_id = $1),
                (SELECT COUNT(*) FROM saved_questions WHERE user_id = $1),
                (SELECT COUNT(*) FROM solved_questions
                  WHERE user_id = $1 AND solved_at >= NOW() - make_interval(days => $2))
            "#,
        )
        .bind(username)
        .bind(RECENT_ACTIVITY_DAYS)
        .fetch_one(&self.pool)
        .await?;

        Ok(ProgressCounts {
            solved,
            saved,
            recent,
        })
    }

    pub async fn update_profile(&self, username: &str, update: ProfileUpdate) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                level = COALESCE($2, level),
                interests = COALESCE($3, interests),
                preferred_languages = COALESCE($4, preferred_languages),
                updated_at = NOW()
            WHERE username = $1
            "#,
        )
        .bind(username)
        .bind(update.level)
        .bind(update.interests)
        .bind(update.preferred_languages)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("User not found".to_string()));
        }
        tracing::info!(username, "Profile updated");
        Ok(())
    }

    pub async fn set_image_url(&self, username: &str, image_url: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (username, email, image_url)
            VALUES ($1, $2, $3)
            ON CONFLICT (username)
            DO UPDATE SET image_url = EXCLUDED.image_url, updated_at = NOW()
            "#,
        )
        .bind(username)
        .bind(default_email(username))
        .bind(image_url)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Clears the stored URL and returns the previous one, if any.
    pub async fn clear_image_url(&self, username: &str) -> Result<Option<String>> {
        let previous: Option<String> = sqlx::query_scalar(
            r#"
            UPDATE users u SET image_url = NULL, updated_at = NOW()
            FROM (SELECT id, image_url FROM users WHERE username = $1 FOR UPDATE) old
            WHERE u.id = old.id AND old.image_url IS NOT NULL
            RETURNING old.image_url
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(total: i32) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: "ada".into(),
            email: default_email("ada"),
            password_hash: None,
            level: "beginner".into(),
            interests: vec!["chess".into()],
            preferred_languages: vec!["javascript".into(), "python".into()],
            timezone: "UTC".into(),
            image_url: None,
            total_questions: total,
            solved_questions: 0,
            streak: 2,
            average_time_per_question: 0.0,
            weak_topics: vec![],
            strong_topics: vec!["Heaps".into()],
            last_active: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn completion_rate_uses_derived_counts() {
        let counts = ProgressCounts {
            solved: 2,
            saved: 5,
            recent: 1,
        };
        let profile = UserProfile::build(user(3), counts);
        assert_eq!(profile.total_questions, 3);
        assert_eq!(profile.solved_questions, 2);
        assert_eq!(profile.completion_rate, 67);
        assert_eq!(profile.saved_questions, 5);
        assert_eq!(profile.recent_activity, 1);
    }

    #[test]
    fn total_never_trails_solved() {
        let counts = ProgressCounts {
            solved: 4,
            ..Default::default()
        };
        let profile = UserProfile::build(user(0), counts);
        assert_eq!(profile.total_questions, 4);
        assert_eq!(profile.completion_rate, 100);
        assert_eq!(UserProfile::build(user(0), ProgressCounts::default()).completion_rate, 0);
    }

    #[test]
    fn empty_topic_lists_get_defaults() {
        let profile = UserProfile::build(user(0), ProgressCounts::default());
        assert_eq!(profile.weak_topics, vec!["Dynamic Programming", "Graphs"]);
        assert_eq!(profile.strong_topics, vec!["Heaps"]);
        let value = serde_json::to_value(&profile).unwrap();
        assert!(value.get("imageUrl").is_none());
        assert_eq!(value["preferredLanguages"][1], "python");
        assert!(value.get("joinDate").is_some());
    }
}
