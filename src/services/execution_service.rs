use crate::error::{Error, Result};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::time::Duration;

/// Runtime versions requested from the execution API.
pub const LANGUAGE_VERSIONS: &[(&str, &str)] = &[
    ("javascript", "18.15.0"),
    ("typescript", "5.0.3"),
    ("python", "3.10.0"),
    ("java", "15.0.2"),
    ("csharp", "6.12.0"),
    ("php", "8.2.3"),
];

pub fn language_version(language: &str) -> Option<&'static str> {
    LANGUAGE_VERSIONS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(language))
        .map(|(_, version)| *version)
}

#[derive(Debug, Serialize)]
struct ExecuteRequest<'a> {
    language: &'a str,
    version: &'a str,
    files: Vec<SourceFile<'a>>,
}

#[derive(Debug, Serialize)]
struct SourceFile<'a> {
    content: &'a str,
}

/// Proxy to a Piston-compatible code execution API.
#[derive(Clone)]
pub struct ExecutionService {
    client: Client,
    base_url: String,
}

impl ExecutionService {
    pub fn new(client: Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn execute(&self, language: &str, source_code: &str) -> Result<JsonValue> {
        let language = language.trim().to_ascii_lowercase();
        let version = language_version(&language)
            .ok_or_else(|| Error::BadRequest(format!("Unsupported language: {}", language)))?;

        let payload = ExecuteRequest {
            language: &language,
            version,
            files: vec![SourceFile {
                content: source_code,
            }],
        };

        let res = self
            .client
            .post(format!("{}/execute", self.base_url))
            .json(&payload)
            .timeout(Duration::from_secs(30))
            .send()
            .await?
            .error_for_status()?;

        let body: JsonValue = res.json().await?;
        tracing::info!(language = %language, version, "Code executed");
        Ok(body)
    }
}
