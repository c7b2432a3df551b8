pub mod answer;
pub mod auth;
pub mod execute;
pub mod health;
pub mod profile;
pub mod question;
pub mod saved_question;
pub mod solved_question;
pub mod topic;

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::{
    config::Config,
    middleware::{
        auth::resolve_user,
        rate_limit::{client_rate_middleware, new_rps_state, rps_middleware, ClientRateLimiter},
    },
    services::storage_service::MAX_IMAGE_BYTES,
    AppState,
};

/// Multipart framing on top of the largest accepted image.
const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 1024 * 1024;

/// Every HTTP route, with identity resolution and both rate limits applied.
pub fn router(state: AppState, config: &Config) -> Router {
    let api = Router::new()
        .route(
            "/api/generate-question",
            post(question::generate_question),
        )
        .route(
            "/api/question",
            get(question::get_question).post(question::store_question),
        )
        .route("/api/generate-answer", post(answer::generate_answer))
        .route(
            "/api/mark-solved",
            get(solved_question::solved_status).post(solved_question::mark_solved),
        )
        .route(
            "/api/saved-questions",
            get(saved_question::list_saved_questions)
                .post(saved_question::save_question)
                .delete(saved_question::remove_saved_question),
        )
        .route(
            "/api/saved-questions/check",
            get(saved_question::check_saved_question).post(saved_question::check_saved_question),
        )
        .route(
            "/api/user-profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route(
            "/api/upload-profile-image",
            post(profile::upload_profile_image)
                .delete(profile::delete_profile_image)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/execute", post(execute::execute_code))
        .route(
            "/interests/topic",
            get(topic::list_topics).post(topic::add_topic),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            resolve_user,
        ));

    let auth = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/api/verify-token", post(auth::verify_token));

    let client_limiter = ClientRateLimiter::new(
        state.cache.clone(),
        config.rate_limit_max,
        Duration::from_secs(config.rate_limit_window_secs),
    );

    Router::new()
        .merge(api)
        .merge(auth)
        .layer(axum::middleware::from_fn_with_state(
            client_limiter,
            client_rate_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            new_rps_state(config.public_rps),
            rps_middleware,
        ))
        .route("/health", get(health::health))
        .with_state(state)
}
