use crate::error::{Error, Result};
use crate::models::question::{Difficulty, Question};
use crate::services::ai_service::CompletionModel;
use crate::utils::retry::RetryPolicy;
use std::sync::Arc;

/// Turns (topic, difficulty) into a validated [`Question`] via the completion model.
#[derive(Clone)]
pub struct QuestionGenerator {
    model: Option<Arc<dyn CompletionModel>>,
    retry: RetryPolicy,
}

impl QuestionGenerator {
    pub fn new(model: Option<Arc<dyn CompletionModel>>, retry: RetryPolicy) -> Self {
        Self { model, retry }
    }

    /// Returns `None` once every attempt has failed; the caller substitutes a fallback.
    pub async fn generate(&self, topic: &str, difficulty: Difficulty) -> Option<Question> {
        let Some(model) = self.model.as_ref() else {
            tracing::warn!("No generative model configured, skipping question generation");
            return None;
        };

        let prompt = build_question_prompt(topic, difficulty);
        let outcome = self
            .retry
            .run("generate_question", |attempt| {
                let model = Arc::clone(model);
                let prompt = prompt.as_str();
                async move {
                    tracing::info!(
                        topic,
                        difficulty = %difficulty,
                        attempt,
                        "Generating question"
                    );
                    let text = model.complete(prompt).await?;
                    tracing::debug!(raw = %truncate(&text, 500), "Raw model response");
                    parse_question(&text)
                }
            })
            .await;

        match outcome {
            Ok(question) => {
                tracing::info!(qname = %question.qname, "Question generated");
                Some(question)
            }
            Err(e) => {
                tracing::error!(topic, error = %e, "Question generation failed after all retries");
                None
            }
        }
    }
}

pub fn build_question_prompt(topic: &str, difficulty: Difficulty) -> String {
    format!(
        r#"Generate a {difficulty} data structures and algorithms coding question themed around "{topic}".
Make it original and never created before, similar in style to LeetCode problems, with the theme woven into the story.
Include exactly 2 example test cases with concrete input and output values.

Respond with ONLY a valid JSON object using exactly these keys in this order:
{{
  "qname": "<short title>",
  "description": "<full problem statement>",
  "constraints": ["<constraint>", "..."],
  "example_test_cases": [
    {{ "input": <value or object>, "output": <value> }},
    {{ "input": <value or object>, "output": <value> }}
  ]
}}
Ensure the JSON is complete and parseable. Do not wrap it in markdown."#,
        difficulty = difficulty,
        topic = topic,
    )
}

/// Slices the JSON object out of free text: the whole text when it already
/// starts with `{`, otherwise from the first `{` to the last `}`.
pub fn extract_json(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Some(trimmed);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

pub fn parse_question(text: &str) -> Result<Question> {
    let json = extract_json(text)
        .ok_or_else(|| Error::BadRequest("Model response contained no JSON object".to_string()))?;
    let question: Question = serde_json::from_str(json)?;
    if !question.is_complete() {
        return Err(Error::BadRequest(
            "Model response is missing qname or description".to_string(),
        ));
    }
    Ok(question)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ai_service::MockCompletionModel;
    use std::time::Duration;

    fn no_wait(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::ZERO)
    }

    #[test]
    fn extracts_object_wrapped_in_chatter() {
        let text = "Here you go:\n{\"qname\":\"X\",\"description\":\"Y\"}\nThanks";
        assert_eq!(
            extract_json(text),
            Some("{\"qname\":\"X\",\"description\":\"Y\"}")
        );
        let q = parse_question(text).unwrap();
        assert_eq!(q.qname, "X");
        assert_eq!(q.description, "Y");
    }

    #[test]
    fn no_braces_means_no_json() {
        assert_eq!(extract_json("I cannot help with that."), None);
        assert_eq!(extract_json("} backwards {"), None);
        assert!(parse_question("plain prose").is_err());
    }

    #[test]
    fn missing_required_fields_is_a_failure() {
        assert!(parse_question("{\"qname\":\"X\"}").is_err());
        assert!(parse_question("{\"qname\":\"\",\"description\":\"Y\"}").is_err());
    }

    #[test]
    fn prompt_mentions_topic_difficulty_and_keys() {
        let prompt = build_question_prompt("space exploration", Difficulty::Hard);
        assert!(prompt.contains("hard"));
        assert!(prompt.contains("space exploration"));
        let qname = prompt.find("\"qname\"").unwrap();
        let examples = prompt.find("\"example_test_cases\"").unwrap();
        assert!(qname < examples);
    }

    #[tokio::test]
    async fn generates_from_chatty_response() {
        let mut model = MockCompletionModel::new();
        model.expect_complete().times(1).returning(|_| {
            Ok("Sure!\n{\"qname\":\"Rocket Fuel\",\"description\":\"Minimise fuel.\",\"constraints\":[\"1 <= n\"],\"example_test_cases\":[{\"input\":[1,2],\"output\":3}]}\nEnjoy".to_string())
        });
        let generator = QuestionGenerator::new(Some(Arc::new(model)), no_wait(3));
        let q = generator.generate("space", Difficulty::Easy).await.unwrap();
        assert_eq!(q.qname, "Rocket Fuel");
        assert_eq!(q.constraints, vec!["1 <= n".to_string()]);
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let mut model = MockCompletionModel::new();
        let mut seq = mockall::Sequence::new();
        model
            .expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(anyhow::anyhow!("connection reset").into()));
        model
            .expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("{\"qname\":\"X\",\"description\":\"Y\"}".to_string()));
        let generator = QuestionGenerator::new(Some(Arc::new(model)), no_wait(3));
        assert!(generator.generate("music", Difficulty::Medium).await.is_some());
    }

    #[tokio::test]
    async fn exhausts_retries_on_braceless_output() {
        let mut model = MockCompletionModel::new();
        model
            .expect_complete()
            .times(3)
            .returning(|_| Ok("no json here at all".to_string()));
        let generator = QuestionGenerator::new(Some(Arc::new(model)), no_wait(3));
        assert!(generator.generate("music", Difficulty::Medium).await.is_none());
    }

    #[tokio::test]
    async fn unconfigured_model_yields_none() {
        let generator = QuestionGenerator::new(None, no_wait(3));
        assert!(generator.generate("music", Difficulty::Easy).await.is_none());
    }
}
