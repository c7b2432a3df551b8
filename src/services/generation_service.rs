use crate::models::question::{Difficulty, Question};
use crate::services::cache_service::{CacheService, QUESTION_TTL_SECS};
use crate::services::fallback::pick_fallback;
use crate::services::question_generator::QuestionGenerator;
use crate::services::question_service::QuestionStore;
use crate::services::topic_service::TopicSource;
use crate::utils::retry::RetryPolicy;
use crate::utils::token::generate_qid;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextQuestion {
    pub qid: String,
    pub question_data: Question,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuestionSource {
    Cache,
    Generated,
    Fallback,
}

impl QuestionSource {
    fn as_str(&self) -> &'static str {
        match self {
            QuestionSource::Cache => "cache",
            QuestionSource::Generated => "generated",
            QuestionSource::Fallback => "fallback",
        }
    }
}

/// Serves the next question: resolve a topic, generate or fall back, cache, persist.
#[derive(Clone)]
pub struct GenerationService {
    topics: TopicSource,
    generator: QuestionGenerator,
    cache: CacheService,
    store: Arc<dyn QuestionStore>,
    persist_retry: RetryPolicy,
}

impl GenerationService {
    pub fn new(
        topics: TopicSource,
        generator: QuestionGenerator,
        cache: CacheService,
        store: Arc<dyn QuestionStore>,
        persist_retry: RetryPolicy,
    ) -> Self {
        Self {
            topics,
            generator,
            cache,
            store,
            persist_retry,
        }
    }

    /// Always yields a usable question. Cache and persistence failures are
    /// logged only, so a returned question is not guaranteed to be durable.
    pub async fn get_next_question(
        &self,
        topic: Option<&str>,
        difficulty: Option<Difficulty>,
    ) -> NextQuestion {
        let started = Instant::now();
        let qid = generate_qid();

        if let Some(cached) = self.cache.get_question(&qid).await {
            self.track(&qid, "", None, QuestionSource::Cache, started);
            return NextQuestion {
                qid,
                question_data: cached,
            };
        }

        let topic = self.topics.resolve_topic(topic).await;
        let difficulty = difficulty.unwrap_or_else(Difficulty::random);

        let (question, source) = match self.generator.generate(&topic, difficulty).await {
            Some(question) => (question, QuestionSource::Generated),
            None => {
                tracing::warn!(topic = %topic, "Using fallback question");
                (pick_fallback(Some(&topic)), QuestionSource::Fallback)
            }
        };

        self.cache
            .set_question(&qid, &question, QUESTION_TTL_SECS)
            .await;

        let persisted = self
            .persist_retry
            .run("persist_question", |_| {
                let store = Arc::clone(&self.store);
                let (qid, question, topic) = (qid.as_str(), &question, topic.as_str());
                async move { store.save(qid, question, Some(topic), Some(difficulty)).await }
            })
            .await;
        if let Err(e) = persisted {
            tracing::error!(qid = %qid, error = %e, "Failed to persist question, returning it anyway");
        }

        self.track(&qid, &topic, Some(difficulty), source, started);
        NextQuestion {
            qid,
            question_data: question,
        }
    }

    fn track(
        &self,
        qid: &str,
        topic: &str,
        difficulty: Option<Difficulty>,
        source: QuestionSource,
        started: Instant,
    ) {
        tracing::info!(
            qid,
            topic,
            difficulty = difficulty.map(|d| d.as_str()).unwrap_or("unknown"),
            source = source.as_str(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Question served"
        );
    }
}
