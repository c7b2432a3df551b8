use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub genai_api_key: Option<String>,
    pub genai_base_url: String,
    pub genai_model: String,
    pub redis_url: Option<String>,
    pub execution_api_url: String,
    pub gcs_bucket: Option<String>,
    pub gcs_access_token: Option<String>,
    pub public_rps: u32,
    pub rate_limit_max: u32,
    pub rate_limit_window_secs: u64,
    pub ai_max_attempts: u32,
    pub ai_retry_base_ms: u64,
    pub question_purge_interval_secs: u64,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            genai_api_key: get_env_opt("GENAI_API_KEY"),
            genai_base_url: get_env_opt("GENAI_BASE_URL")
                .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string()),
            genai_model: get_env_opt("GENAI_MODEL")
                .unwrap_or_else(|| "gemini-1.5-flash".to_string()),
            redis_url: get_env_opt("REDIS_URL"),
            execution_api_url: get_env_opt("EXECUTION_API_URL")
                .unwrap_or_else(|| "https://emkc.org/api/v2/piston".to_string()),
            gcs_bucket: get_env_opt("GCS_BUCKET"),
            gcs_access_token: get_env_opt("GCS_ACCESS_TOKEN"),
            public_rps: get_env_parse_or("PUBLIC_RPS", 50)?,
            rate_limit_max: get_env_parse_or("RATE_LIMIT_MAX", 100)?,
            rate_limit_window_secs: get_env_parse_or("RATE_LIMIT_WINDOW_SECS", 900)?,
            ai_max_attempts: get_env_parse_or("AI_MAX_ATTEMPTS", 3)?,
            ai_retry_base_ms: get_env_parse_or("AI_RETRY_BASE_MS", 2000)?,
            question_purge_interval_secs: get_env_parse_or("QUESTION_PURGE_INTERVAL_SECS", 300)?,
        })
    }

    pub fn ai_retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.ai_retry_base_ms)
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

/// Unset and blank values are both treated as absent.
fn get_env_opt(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_opt(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
