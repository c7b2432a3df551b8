use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A free-text generative model: prompt in, text out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Gemini `generateContent` client.
#[derive(Clone)]
pub struct AIService {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AIService {
    pub fn new(api_key: String, base_url: String, model: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl CompletionModel for AIService {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let payload = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.9,
                max_output_tokens: 4096,
            },
        };

        let started = std::time::Instant::now();
        let res = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .timeout(Duration::from_secs(120))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Gemini API Error {}: {}", status, text).into());
        }

        let body: GenerateResponse = res.json().await?;
        let text = extract_text(body)
            .ok_or_else(|| anyhow::anyhow!("Gemini response contained no text"))?;

        tracing::info!(
            model = %self.model,
            latency_ms = started.elapsed().as_millis() as u64,
            response_chars = text.len(),
            "Model completion received"
        );
        Ok(text)
    }
}

fn extract_text(body: GenerateResponse) -> Option<String> {
    let text: String = body
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .map(|p| p.text)
        .collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_all_parts_of_first_candidate() {
        let body: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [
                { "content": { "parts": [ { "text": "Here you go: " }, { "text": "{}" } ] } },
                { "content": { "parts": [ { "text": "ignored" } ] } }
            ]
        }))
        .unwrap();
        assert_eq!(extract_text(body).as_deref(), Some("Here you go: {}"));
    }

    #[test]
    fn blocked_response_has_no_text() {
        let body: GenerateResponse =
            serde_json::from_value(serde_json::json!({ "candidates": [ {} ] })).unwrap();
        assert_eq!(extract_text(body), None);
        let body: GenerateResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(extract_text(body), None);
    }

    #[test]
    fn endpoint_includes_model() {
        let svc = AIService::new(
            "k".into(),
            "https://example.test/v1beta/".into(),
            "gemini-1.5-flash".into(),
            Client::new(),
        );
        assert_eq!(
            svc.endpoint(),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn transport_failure_does_not_expose_api_key() {
        use axum::response::IntoResponse;

        let svc = AIService::new(
            "SECRET-KEY-123".into(),
            "http://127.0.0.1:9/v1beta".into(),
            "m".into(),
            Client::new(),
        );
        let err = svc.complete("hi").await.unwrap_err();
        assert!(!err.to_string().contains("SECRET-KEY-123"));

        let resp = err.into_response();
        assert_eq!(resp.status(), axum::http::StatusCode::BAD_GATEWAY);
        let bytes = axum::body::to_bytes(resp.into_body(), 4096).await.unwrap();
        let body = String::from_utf8_lossy(&bytes);
        assert!(!body.contains("SECRET-KEY-123"));
        assert!(!body.contains("127.0.0.1"));
    }
}
