pub mod ai_service;
pub mod answer_service;
pub mod auth_service;
pub mod cache_service;
pub mod execution_service;
pub mod fallback;
pub mod generation_service;
pub mod question_generator;
pub mod question_service;
pub mod saved_question_service;
pub mod solved_question_service;
pub mod storage_service;
pub mod topic_service;
pub mod user_service;
