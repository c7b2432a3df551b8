pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::services::{
    ai_service::{AIService, CompletionModel},
    answer_service::{AnswerService, PgAnswerStore},
    auth_service::AuthService,
    cache_service::CacheService,
    execution_service::ExecutionService,
    generation_service::GenerationService,
    question_generator::QuestionGenerator,
    question_service::QuestionService,
    saved_question_service::SavedQuestionService,
    solved_question_service::SolvedQuestionService,
    storage_service::StorageService,
    topic_service::{TopicService, TopicSource},
    user_service::UserService,
};
use crate::utils::retry::RetryPolicy;
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub cache: CacheService,
    pub question_service: QuestionService,
    pub topic_source: TopicSource,
    pub generation_service: GenerationService,
    pub answer_service: AnswerService,
    pub saved_question_service: SavedQuestionService,
    pub solved_question_service: SolvedQuestionService,
    pub user_service: UserService,
    pub auth_service: AuthService,
    pub storage_service: StorageService,
    pub execution_service: ExecutionService,
}

impl AppState {
    pub fn new(pool: PgPool, cache: CacheService, config: &Config) -> Self {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| Client::new());

        let model: Option<Arc<dyn CompletionModel>> = match config.genai_api_key.clone() {
            Some(key) => Some(Arc::new(AIService::new(
                key,
                config.genai_base_url.clone(),
                config.genai_model.clone(),
                http_client.clone(),
            ))),
            None => {
                tracing::warn!("GENAI_API_KEY not set, serving fallback questions and template answers");
                None
            }
        };
        let retry = RetryPolicy::new(config.ai_max_attempts, config.ai_retry_base_delay());

        let question_service = QuestionService::new(pool.clone());
        let topic_source = TopicSource::new(Arc::new(TopicService::new(pool.clone())), cache.clone());

        let generation_service = GenerationService::new(
            topic_source.clone(),
            QuestionGenerator::new(model.clone(), retry),
            cache.clone(),
            Arc::new(question_service.clone()),
            retry,
        );
        let answer_service = AnswerService::new(
            Arc::new(question_service.clone()),
            Arc::new(PgAnswerStore::new(pool.clone())),
            model,
            retry,
        );

        let user_service = UserService::new(pool.clone());
        let auth_service = AuthService::new(user_service.clone(), config.jwt_secret.clone());
        let storage_service = StorageService::new(
            http_client.clone(),
            config.gcs_bucket.clone(),
            config.gcs_access_token.clone(),
        );
        let execution_service =
            ExecutionService::new(http_client, config.execution_api_url.clone());

        Self {
            saved_question_service: SavedQuestionService::new(pool.clone()),
            solved_question_service: SolvedQuestionService::new(pool.clone()),
            pool,
            cache,
            question_service,
            topic_source,
            generation_service,
            answer_service,
            user_service,
            auth_service,
            storage_service,
            execution_service,
        }
    }
}
