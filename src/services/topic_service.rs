use crate::error::{Error, Result};
use crate::models::topic::Topic;
use crate::services::cache_service::{CacheService, TOPICS_TTL_SECS};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use sqlx::{FromRow, PgPool, Row};
use std::sync::Arc;

/// Used when nothing has ever been recorded.
pub const BUILTIN_TOPICS: &[&str] = &[
    "space exploration",
    "cricket",
    "music festivals",
    "cooking",
    "football",
    "movies",
    "travel",
    "personal finance",
    "wildlife",
    "video games",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicRecord {
    Inserted,
    Incremented,
}

/// Outcome of recording a topic, with its frequency after the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedTopic {
    pub outcome: TopicRecord,
    pub freq: i32,
}

/// Persistent topic registry with observed frequencies.
#[async_trait]
pub trait TopicStore: Send + Sync {
    async fn record(&self, topic: &str) -> Result<RecordedTopic>;
    async fn list(&self) -> Result<Vec<String>>;
}

#[derive(Clone)]
pub struct TopicService {
    pool: PgPool,
}

impl TopicService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TopicStore for TopicService {
    async fn record(&self, topic: &str) -> Result<RecordedTopic> {
        let row = sqlx::query(
            r#"
            INSERT INTO topics (topic, freq)
            VALUES ($1, 1)
            ON CONFLICT (topic)
            DO UPDATE SET freq = topics.freq + 1, updated_at = NOW()
            RETURNING id, topic, freq, created_at, updated_at, (xmax = 0) AS inserted
            "#,
        )
        .bind(topic)
        .fetch_one(&self.pool)
        .await?;

        let inserted: bool = row.try_get("inserted")?;
        let recorded = Topic::from_row(&row)?;
        tracing::debug!(topic = %recorded.topic, freq = recorded.freq, "Topic recorded");
        let outcome = if inserted {
            TopicRecord::Inserted
        } else {
            TopicRecord::Incremented
        };
        Ok(RecordedTopic {
            outcome,
            freq: recorded.freq,
        })
    }

    async fn list(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT topic FROM topics ORDER BY freq DESC, topic ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("topic").map_err(Error::from))
            .collect()
    }
}

/// Resolves the topic for a question request. Held in application state and
/// passed to the orchestrator; there is no process-wide topic list.
#[derive(Clone)]
pub struct TopicSource {
    store: Arc<dyn TopicStore>,
    cache: CacheService,
}

impl TopicSource {
    pub fn new(store: Arc<dyn TopicStore>, cache: CacheService) -> Self {
        Self { store, cache }
    }

    /// A supplied topic is trimmed, recorded and returned; otherwise a topic is
    /// drawn uniformly from the registry (or the built-in list when it is empty).
    /// Frequencies are tracked but do not weight the draw.
    pub async fn resolve_topic(&self, user_supplied: Option<&str>) -> String {
        if let Some(topic) = user_supplied.map(str::trim).filter(|t| !t.is_empty()) {
            if let Err(e) = self.record_topic(topic).await {
                tracing::warn!(topic, error = %e, "Failed to record topic");
            }
            return topic.to_string();
        }

        let candidates = self.list_topics().await;
        let pick = candidates.choose(&mut rand::thread_rng()).cloned();
        pick.unwrap_or_else(|| {
            BUILTIN_TOPICS
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or("arrays")
                .to_string()
        })
    }

    pub async fn record_topic(&self, topic: &str) -> Result<RecordedTopic> {
        let recorded = self.store.record(topic).await?;
        if recorded.outcome == TopicRecord::Inserted {
            self.cache.invalidate_topics().await;
        }
        Ok(recorded)
    }

    /// Cache first, then persistence. A persistence failure yields an empty list.
    pub async fn list_topics(&self) -> Vec<String> {
        if let Some(topics) = self.cache.get_topics().await {
            if !topics.is_empty() {
                return topics;
            }
        }
        match self.store.list().await {
            Ok(topics) => {
                if !topics.is_empty() {
                    self.cache.set_topics(&topics, TOPICS_TTL_SECS).await;
                }
                topics
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load topics");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct InMemoryTopics {
        pub freqs: Mutex<BTreeMap<String, i32>>,
        pub fail: bool,
    }

    #[async_trait]
    impl TopicStore for InMemoryTopics {
        async fn record(&self, topic: &str) -> Result<RecordedTopic> {
            if self.fail {
                return Err(Error::Internal("store down".into()));
            }
            let mut freqs = self.freqs.lock().unwrap();
            let entry = freqs.entry(topic.to_string()).or_insert(0);
            *entry += 1;
            let outcome = if *entry == 1 {
                TopicRecord::Inserted
            } else {
                TopicRecord::Incremented
            };
            Ok(RecordedTopic {
                outcome,
                freq: *entry,
            })
        }

        async fn list(&self) -> Result<Vec<String>> {
            if self.fail {
                return Err(Error::Internal("store down".into()));
            }
            Ok(self.freqs.lock().unwrap().keys().cloned().collect())
        }
    }

    #[tokio::test]
    async fn supplied_topic_is_trimmed_and_counted() {
        let store = Arc::new(InMemoryTopics::default());
        let source = TopicSource::new(store.clone(), CacheService::disabled());

        assert_eq!(source.resolve_topic(Some("  graphs ")).await, "graphs");
        assert_eq!(source.resolve_topic(Some("graphs")).await, "graphs");
        assert_eq!(store.freqs.lock().unwrap().get("graphs"), Some(&2));
    }

    #[tokio::test]
    async fn recording_reports_outcome_and_frequency() {
        let source = TopicSource::new(Arc::new(InMemoryTopics::default()), CacheService::disabled());

        let first = source.record_topic("tennis").await.unwrap();
        assert_eq!(first, RecordedTopic { outcome: TopicRecord::Inserted, freq: 1 });
        let second = source.record_topic("tennis").await.unwrap();
        assert_eq!(second, RecordedTopic { outcome: TopicRecord::Incremented, freq: 2 });
    }

    #[tokio::test]
    async fn random_pick_comes_from_registry() {
        let store = Arc::new(InMemoryTopics::default());
        store.freqs.lock().unwrap().insert("chess".into(), 4);
        store.freqs.lock().unwrap().insert("poetry".into(), 1);
        let source = TopicSource::new(store, CacheService::disabled());

        for _ in 0..20 {
            let topic = source.resolve_topic(None).await;
            assert!(topic == "chess" || topic == "poetry");
        }
    }

    #[tokio::test]
    async fn empty_or_failing_registry_uses_builtins() {
        let source = TopicSource::new(Arc::new(InMemoryTopics::default()), CacheService::disabled());
        assert!(BUILTIN_TOPICS.contains(&source.resolve_topic(None).await.as_str()));
        assert!(BUILTIN_TOPICS.contains(&source.resolve_topic(Some("   ")).await.as_str()));

        let failing = InMemoryTopics {
            fail: true,
            ..Default::default()
        };
        let source = TopicSource::new(Arc::new(failing), CacheService::disabled());
        assert!(BUILTIN_TOPICS.contains(&source.resolve_topic(None).await.as_str()));
        assert_eq!(source.resolve_topic(Some("dp")).await, "dp");
    }
}
