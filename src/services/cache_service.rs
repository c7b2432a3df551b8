use crate::models::question::Question;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

pub const QUESTION_TTL_SECS: u64 = 3600;
pub const TOPICS_TTL_SECS: u64 = 1800;
const TOPICS_KEY: &str = "topics";

/// Best-effort Redis cache. Never authoritative: every failure is logged and
/// reported to the caller as a miss (or as "unknown" for rate limits).
#[derive(Clone)]
pub struct CacheService {
    conn: Option<ConnectionManager>,
}

impl CacheService {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn: Some(conn) }
    }

    pub fn disabled() -> Self {
        Self { conn: None }
    }

    /// Connects when a URL is configured; an unreachable server disables the cache.
    pub async fn connect(redis_url: Option<&str>) -> Self {
        let Some(url) = redis_url else {
            tracing::info!("REDIS_URL not set, cache disabled");
            return Self::disabled();
        };
        let client = match redis::Client::open(url) {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid Redis URL, cache disabled");
                return Self::disabled();
            }
        };
        match ConnectionManager::new(client).await {
            Ok(conn) => {
                tracing::info!("Connected to Redis cache");
                Self::new(conn)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis unavailable, cache disabled");
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.conn.is_some()
    }

    fn question_key(qid: &str) -> String {
        format!("question:{}", qid)
    }

    pub async fn get_question(&self, qid: &str) -> Option<Question> {
        let raw = self.get_raw(&Self::question_key(qid)).await?;
        match serde_json::from_str(&raw) {
            Ok(question) => Some(question),
            Err(e) => {
                tracing::warn!(qid, error = %e, "Discarding undecodable cached question");
                None
            }
        }
    }

    pub async fn set_question(&self, qid: &str, question: &Question, ttl_secs: u64) {
        match serde_json::to_string(question) {
            Ok(raw) => self.set_raw(&Self::question_key(qid), raw, ttl_secs).await,
            Err(e) => tracing::warn!(qid, error = %e, "Could not encode question for cache"),
        }
    }

    pub async fn get_topics(&self) -> Option<Vec<String>> {
        let raw = self.get_raw(TOPICS_KEY).await?;
        serde_json::from_str(&raw).ok()
    }

    pub async fn set_topics(&self, topics: &[String], ttl_secs: u64) {
        if let Ok(raw) = serde_json::to_string(topics) {
            self.set_raw(TOPICS_KEY, raw, ttl_secs).await;
        }
    }

    pub async fn invalidate_topics(&self) {
        let Some(mut conn) = self.conn.clone() else {
            return;
        };
        let result: redis::RedisResult<()> = conn.del(TOPICS_KEY).await;
        if let Err(e) = result {
            tracing::warn!(error = %e, "Redis del error");
        }
    }

    /// Fixed-window counter. `None` when the cache cannot answer.
    pub async fn check_rate_limit(&self, client: &str, limit: i64, window_secs: i64) -> Option<bool> {
        let mut conn = self.conn.clone()?;
        let key = format!("rate_limit:{}", client);
        let incremented: redis::RedisResult<i64> = conn.incr(&key, 1).await;
        let current = match incremented {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, "Redis rate limit error");
                return None;
            }
        };
        if current == 1 {
            let result: redis::RedisResult<()> = conn.expire(&key, window_secs).await;
            if let Err(e) = result {
                tracing::warn!(error = %e, "Redis expire error");
            }
        }
        Some(current <= limit)
    }

    async fn get_raw(&self, key: &str) -> Option<String> {
        let mut conn = self.conn.clone()?;
        let value: redis::RedisResult<Option<String>> = conn.get(key).await;
        match value {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Redis get error");
                None
            }
        }
    }

    async fn set_raw(&self, key: &str, value: String, ttl_secs: u64) {
        let Some(mut conn) = self.conn.clone() else {
            return;
        };
        let result: redis::RedisResult<()> = conn.set_ex(key, value, ttl_secs).await;
        if let Err(e) = result {
            tracing::warn!(key, error = %e, "Redis set error");
        }
    }
}
