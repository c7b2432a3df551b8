use codesensei_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes,
    services::cache_service::CacheService,
    AppState,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let cache = CacheService::connect(config.redis_url.as_deref()).await;
    let app_state = AppState::new(pool, cache, config);

    {
        let questions = app_state.question_service.clone();
        let interval = Duration::from_secs(config.question_purge_interval_secs.max(1));
        tokio::spawn(async move {
            loop {
                match questions.purge_expired().await {
                    Ok(0) => {}
                    Ok(removed) => info!(removed, "Purged expired questions"),
                    Err(e) => tracing::error!(error = ?e, "Expired question purge failed"),
                }
                tokio::time::sleep(interval).await;
            }
        });
    }

    let app = routes::router(app_state, config)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
