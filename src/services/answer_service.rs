use crate::error::{Error, Result};
use crate::models::answer::{AnswerRecord, GeneratedAnswer};
use crate::models::question::Question;
use crate::services::ai_service::CompletionModel;
use crate::services::question_service::QuestionStore;
use crate::utils::retry::RetryPolicy;
use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use sqlx::types::Json;
use sqlx::PgPool;
use std::sync::{Arc, OnceLock};

const NOT_SPECIFIED: &str = "Not specified";

/// Generated solutions keyed by (question, language, user).
#[async_trait]
pub trait AnswerStore: Send + Sync {
    async fn find(
        &self,
        question_id: &str,
        language: &str,
        user_id: &str,
    ) -> Result<Option<AnswerRecord>>;

    /// Insert or replace in one statement; `generated_at` is always refreshed.
    async fn upsert(
        &self,
        question_id: &str,
        language: &str,
        user_id: &str,
        answer: &GeneratedAnswer,
        is_regenerated: bool,
    ) -> Result<AnswerRecord>;
}

#[derive(Clone)]
pub struct PgAnswerStore {
    pool: PgPool,
}

impl PgAnswerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnswerStore for PgAnswerStore {
    async fn find(
        &self,
        question_id: &str,
        language: &str,
        user_id: &str,
    ) -> Result<Option<AnswerRecord>> {
        let record = sqlx::query_as::<_, AnswerRecord>(
            r#"
            SELECT id, question_id, language, user_id, answer, generated_at, is_regenerated
            FROM generated_answers
            WHERE question_id = $1 AND language = $2 AND user_id = $3
            "#,
        )
        .bind(question_id)
        .bind(language)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn upsert(
        &self,
        question_id: &str,
        language: &str,
        user_id: &str,
        answer: &GeneratedAnswer,
        is_regenerated: bool,
    ) -> Result<AnswerRecord> {
        let record = sqlx::query_as::<_, AnswerRecord>(
            r#"
            INSERT INTO generated_answers (question_id, language, user_id, answer, is_regenerated)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (question_id, language, user_id)
            DO UPDATE SET answer = EXCLUDED.answer,
                          is_regenerated = EXCLUDED.is_regenerated,
                          generated_at = NOW()
            RETURNING id, question_id, language, user_id, answer, generated_at, is_regenerated
            "#,
        )
        .bind(question_id)
        .bind(language)
        .bind(user_id)
        .bind(Json(answer))
        .bind(is_regenerated)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerOutcome {
    pub answer: GeneratedAnswer,
    pub cached: bool,
}

#[derive(Clone)]
pub struct AnswerService {
    questions: Arc<dyn QuestionStore>,
    answers: Arc<dyn AnswerStore>,
    model: Option<Arc<dyn CompletionModel>>,
    retry: RetryPolicy,
}

impl AnswerService {
    pub fn new(
        questions: Arc<dyn QuestionStore>,
        answers: Arc<dyn AnswerStore>,
        model: Option<Arc<dyn CompletionModel>>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            questions,
            answers,
            model,
            retry,
        }
    }

    pub async fn generate_answer(
        &self,
        question_id: &str,
        language: &str,
        user_id: &str,
        force_regenerate: bool,
    ) -> Result<AnswerOutcome> {
        let question = self
            .questions
            .get(question_id)
            .await?
            .ok_or_else(|| Error::NotFound("Question not found".to_string()))?;

        if !force_regenerate {
            if let Some(existing) = self.answers.find(question_id, language, user_id).await? {
                tracing::info!(question_id, language, "Returning stored answer");
                return Ok(AnswerOutcome {
                    answer: existing.answer.0,
                    cached: true,
                });
            }
        }

        let Some(model) = self.model.as_ref() else {
            tracing::warn!(question_id, language, "No generative model configured, returning template answer");
            return Ok(AnswerOutcome {
                answer: fallback_answer(language),
                cached: false,
            });
        };

        let prompt = build_answer_prompt(&question.data, language);
        let text = self
            .retry
            .run("generate_answer", |attempt| {
                let model = Arc::clone(model);
                let prompt = prompt.as_str();
                async move {
                    tracing::info!(question_id, language, attempt, force_regenerate, "Generating answer");
                    model.complete(prompt).await
                }
            })
            .await?;

        let answer = parse_ai_response(&text);
        let record = self
            .answers
            .upsert(question_id, language, user_id, &answer, force_regenerate)
            .await?;
        tracing::info!(
            question_id,
            language,
            user_id,
            is_regenerated = record.is_regenerated,
            "Answer stored"
        );

        Ok(AnswerOutcome {
            answer: record.answer.0,
            cached: false,
        })
    }
}

pub fn build_answer_prompt(question: &Question, language: &str) -> String {
    let constraints = if question.constraints.is_empty() {
        "None specified".to_string()
    } else {
        question
            .constraints
            .iter()
            .map(|c| format!("- {}", c))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let examples = if question.example_test_cases.is_empty() {
        "No examples provided".to_string()
    } else {
        question
            .example_test_cases
            .iter()
            .enumerate()
            .map(|(i, example)| {
                format!(
                    "Example {}:\nInput: {}\nOutput: {}\nExplanation: {}",
                    i + 1,
                    example.input,
                    example.output,
                    example.explanation.as_deref().unwrap_or("N/A")
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    format!(
        r#"You are an expert programming tutor. Provide a complete solution for the following coding problem in {language}.

**Problem:**
{qname}

**Description:**
{description}

**Constraints:**
{constraints}

**Example Test Cases:**
{examples}

**Requirements:**
1. Provide a complete, working solution in {language}
2. The solution must reproduce every example output above exactly
3. Include time and space complexity analysis
4. Explain the approach and comment the key parts of the code
5. Handle edge cases

**Response Format:**
**Approach:**
[Explain the algorithm]

**Solution:**
```{language}
[Complete code]
```

**Time Complexity:** O(...)
**Space Complexity:** O(...)

**Explanation:**
[How the solution works]

**Edge Cases:**
[Edge cases and how they are handled]

**Alternative Approaches:**
[Other possible solutions, if any]"#,
        language = language,
        qname = question.qname,
        description = question.description,
        constraints = constraints,
        examples = examples,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Approach,
    Solution,
    TimeComplexity,
    SpaceComplexity,
    Explanation,
    EdgeCases,
    Alternatives,
}

impl Section {
    fn from_header(header: &str) -> Option<Self> {
        match header.to_ascii_lowercase().as_str() {
            "approach" => Some(Section::Approach),
            "solution" => Some(Section::Solution),
            "time complexity" => Some(Section::TimeComplexity),
            "space complexity" => Some(Section::SpaceComplexity),
            "explanation" => Some(Section::Explanation),
            "edge cases" => Some(Section::EdgeCases),
            "alternative approaches" => Some(Section::Alternatives),
            _ => None,
        }
    }
}

fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?im)(?:^[ \t#]*|\*\*)(approach|solution|time complexity|space complexity|explanation|edge cases|alternative approaches)[ \t]*:[ \t]*(?:\*\*)?",
        )
        .expect("section header pattern is valid")
    })
}

fn code_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```[A-Za-z0-9_+#-]*[ \t]*\r?\n?(.*?)```")
            .expect("code fence pattern is valid")
    })
}

/// Splits a model reply into its named sections. The first occurrence of a
/// header wins; text sections run until the next recognized header. Headers
/// inside fenced code are comments, not sections.
pub fn parse_ai_response(text: &str) -> GeneratedAnswer {
    let fences: Vec<(usize, usize)> = code_block_regex()
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect();
    let in_fence = |pos: usize| fences.iter().any(|&(start, end)| pos > start && pos < end);

    let headers: Vec<(Section, usize, usize)> = header_regex()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            if in_fence(whole.start()) {
                return None;
            }
            let section = Section::from_header(caps.get(1)?.as_str())?;
            Some((section, whole.start(), whole.end()))
        })
        .collect();

    let body = |wanted: Section| section_body(text, &headers, wanted);

    let text_section = |wanted: Section| body(wanted).unwrap_or_default().to_string();

    let complexity = |wanted: Section| {
        body(wanted)
            .and_then(|b| b.lines().next())
            .map(|line| line.trim().trim_end_matches("**").trim())
            .filter(|line| !line.is_empty())
            .unwrap_or(NOT_SPECIFIED)
            .to_string()
    };

    let solution = code_block_regex()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    GeneratedAnswer {
        approach: text_section(Section::Approach),
        solution,
        time_complexity: complexity(Section::TimeComplexity),
        space_complexity: complexity(Section::SpaceComplexity),
        explanation: text_section(Section::Explanation),
        edge_cases: text_section(Section::EdgeCases),
        alternative_approaches: text_section(Section::Alternatives),
        raw_response: text.to_string(),
    }
}

fn section_body<'a>(
    text: &'a str,
    headers: &[(Section, usize, usize)],
    wanted: Section,
) -> Option<&'a str> {
    let idx = headers.iter().position(|(s, _, _)| *s == wanted)?;
    let start = headers[idx].2;
    let end = headers.get(idx + 1).map(|h| h.1).unwrap_or(text.len());
    Some(text[start..end].trim())
}

/// Static answer used when no model is configured.
pub fn fallback_answer(language: &str) -> GeneratedAnswer {
    GeneratedAnswer {
        approach: "This is a basic solution template. Configure the generative model API key for a detailed solution.".to_string(),
        solution: solution_template(language).to_string(),
        time_complexity: "O(n) - depends on the specific problem".to_string(),
        space_complexity: "O(1) - depends on the specific problem".to_string(),
        explanation: "This is a placeholder solution because the AI service is not available.".to_string(),
        edge_cases: "Consider edge cases like empty inputs, single elements, and boundary conditions.".to_string(),
        alternative_approaches: "Iterative or recursive variants, or a different data structure.".to_string(),
        raw_response: "Fallback solution generated due to AI service unavailability".to_string(),
    }
}

fn solution_template(language: &str) -> &'static str {
    match language.trim().to_ascii_lowercase().as_str() {
        "python" => {
            "def solve(input):\n    # Your solution here\n    # Consider the problem constraints and examples\n\n    return result"
        }
        "java" => {
            "public class Solution {\n    public static int solve(int[] input) {\n        // Your solution here\n        // Consider the problem constraints and examples\n\n        return result;\n    }\n}"
        }
        "cpp" | "c++" => {
            "#include <iostream>\n#include <vector>\nusing namespace std;\n\nint solve(vector<int>& input) {\n    // Your solution here\n    // Consider the problem constraints and examples\n\n    return result;\n}"
        }
        _ => {
            "function solve(input) {\n    // Your solution here\n    // Consider the problem constraints and examples\n\n    return result;\n}"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ai_service::MockCompletionModel;
    use crate::services::fallback::fallback_at;
    use crate::services::question_service::tests::InMemoryQuestions;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;
    use uuid::Uuid;

    const REPLY: &str = "**Approach:**\nUse a hash map.\n\n**Solution:**\n```python\ndef two_sum(nums, t):\n    return []\n```\n\n**Time Complexity:** O(n)\n**Space Complexity:** O(n)\n\n**Explanation:**\nWalk once.\n\n**Edge Cases:**\nEmpty input.\n\n**Alternative Approaches:**\nSort and use two pointers.";

    #[derive(Default)]
    struct InMemoryAnswers {
        rows: Mutex<HashMap<(String, String, String), AnswerRecord>>,
    }

    #[async_trait]
    impl AnswerStore for InMemoryAnswers {
        async fn find(
            &self,
            question_id: &str,
            language: &str,
            user_id: &str,
        ) -> Result<Option<AnswerRecord>> {
            let key = (question_id.to_string(), language.to_string(), user_id.to_string());
            Ok(self.rows.lock().unwrap().get(&key).cloned())
        }

        async fn upsert(
            &self,
            question_id: &str,
            language: &str,
            user_id: &str,
            answer: &GeneratedAnswer,
            is_regenerated: bool,
        ) -> Result<AnswerRecord> {
            let key = (question_id.to_string(), language.to_string(), user_id.to_string());
            let record = AnswerRecord {
                id: Uuid::new_v4(),
                question_id: question_id.to_string(),
                language: language.to_string(),
                user_id: user_id.to_string(),
                answer: Json(answer.clone()),
                generated_at: Utc::now(),
                is_regenerated,
            };
            self.rows.lock().unwrap().insert(key, record.clone());
            Ok(record)
        }
    }

    fn service(model: Option<MockCompletionModel>, answers: Arc<InMemoryAnswers>) -> AnswerService {
        let questions = Arc::new(InMemoryQuestions::with("q1", fallback_at(2, Some("Chess"))));
        AnswerService::new(
            questions,
            answers,
            model.map(|m| Arc::new(m) as Arc<dyn CompletionModel>),
            RetryPolicy::new(3, Duration::ZERO),
        )
    }

    #[test]
    fn parses_every_section() {
        let answer = parse_ai_response(REPLY);
        assert_eq!(answer.approach, "Use a hash map.");
        assert_eq!(answer.solution, "def two_sum(nums, t):\n    return []");
        assert_eq!(answer.time_complexity, "O(n)");
        assert_eq!(answer.space_complexity, "O(n)");
        assert_eq!(answer.explanation, "Walk once.");
        assert_eq!(answer.edge_cases, "Empty input.");
        assert_eq!(answer.alternative_approaches, "Sort and use two pointers.");
        assert_eq!(answer.raw_response, REPLY);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let answer = parse_ai_response("Just some code:\n```\nx = 1\n```");
        assert_eq!(answer.approach, "");
        assert_eq!(answer.solution, "x = 1");
        assert_eq!(answer.time_complexity, "Not specified");
        assert_eq!(answer.space_complexity, "Not specified");
        assert_eq!(answer.edge_cases, "");
    }

    #[test]
    fn headers_without_bold_are_recognized() {
        let answer = parse_ai_response("approach: greedy\ntime complexity: O(n log n)\n");
        assert_eq!(answer.approach, "greedy");
        assert_eq!(answer.time_complexity, "O(n log n)");
    }

    #[test]
    fn comments_inside_code_are_not_sections() {
        let reply = "**Approach:**\nCount items.\n\n**Solution:**\n```python\ndef count(nums):\n    # Edge cases: empty list\n    # Time complexity: O(n^2) naive\n    if not nums:\n        return 0\n    return len(nums)\n```\n\n**Time Complexity:** O(n)\n\n**Edge Cases:**\nEmpty input returns 0.";
        let answer = parse_ai_response(reply);
        assert_eq!(answer.edge_cases, "Empty input returns 0.");
        assert_eq!(answer.time_complexity, "O(n)");
        assert_eq!(answer.approach, "Count items.");
        assert!(answer.solution.contains("# Edge cases: empty list"));
        assert!(answer.solution.ends_with("return len(nums)"));
    }

    #[test]
    fn prompt_embeds_examples_verbatim() {
        let question = fallback_at(2, Some("Chess"));
        let prompt = build_answer_prompt(&question, "rust");
        assert!(prompt.contains(&question.qname));
        assert!(prompt.contains(r#"{"nums":[2,7,11,15],"target":9}"#));
        assert!(prompt.contains("Output: [0,1]"));
        assert!(prompt.contains("```rust"));
    }

    #[test]
    fn templates_cover_known_languages() {
        assert!(fallback_answer("Python").solution.starts_with("def solve"));
        assert!(fallback_answer("java").solution.contains("public class Solution"));
        assert!(fallback_answer("cpp").solution.contains("#include <vector>"));
        assert!(fallback_answer("haskell").solution.starts_with("function solve"));
    }

    #[tokio::test]
    async fn second_call_is_served_from_storage() {
        let mut model = MockCompletionModel::new();
        model.expect_complete().times(1).returning(|_| Ok(REPLY.to_string()));
        let svc = service(Some(model), Arc::new(InMemoryAnswers::default()));

        let first = svc.generate_answer("q1", "python", "default_user", false).await.unwrap();
        assert!(!first.cached);
        let second = svc.generate_answer("q1", "python", "default_user", false).await.unwrap();
        assert!(second.cached);
        assert_eq!(first.answer, second.answer);
    }

    #[tokio::test]
    async fn forced_regeneration_replaces_record() {
        let mut model = MockCompletionModel::new();
        model.expect_complete().times(2).returning(|_| Ok(REPLY.to_string()));
        let answers = Arc::new(InMemoryAnswers::default());
        let svc = service(Some(model), answers.clone());

        svc.generate_answer("q1", "python", "alice", false).await.unwrap();
        let key = ("q1".to_string(), "python".to_string(), "alice".to_string());
        let before = answers.rows.lock().unwrap().get(&key).cloned().unwrap();
        assert!(!before.is_regenerated);

        tokio::time::sleep(Duration::from_millis(5)).await;
        let outcome = svc.generate_answer("q1", "python", "alice", true).await.unwrap();
        assert!(!outcome.cached);

        let after = answers.rows.lock().unwrap().get(&key).cloned().unwrap();
        assert!(after.is_regenerated);
        assert!(after.generated_at > before.generated_at);
        assert_eq!(answers.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_regeneration_keeps_prior_answer() {
        let mut model = MockCompletionModel::new();
        let mut seq = mockall::Sequence::new();
        model
            .expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(REPLY.to_string()));
        model
            .expect_complete()
            .times(3)
            .in_sequence(&mut seq)
            .returning(|_| Err(anyhow::anyhow!("quota exceeded").into()));
        let answers = Arc::new(InMemoryAnswers::default());
        let svc = service(Some(model), answers.clone());

        svc.generate_answer("q1", "java", "bob", false).await.unwrap();
        assert!(svc.generate_answer("q1", "java", "bob", true).await.is_err());
        let kept = svc.generate_answer("q1", "java", "bob", false).await.unwrap();
        assert!(kept.cached);
        assert_eq!(kept.answer.approach, "Use a hash map.");
    }

    #[tokio::test]
    async fn unconfigured_model_returns_unsaved_template() {
        let answers = Arc::new(InMemoryAnswers::default());
        let svc = service(None, answers.clone());
        let outcome = svc.generate_answer("q1", "cpp", "default_user", false).await.unwrap();
        assert!(!outcome.cached);
        assert!(outcome.answer.solution.contains("vector<int>"));
        assert!(answers.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_question_is_not_found() {
        let svc = service(None, Arc::new(InMemoryAnswers::default()));
        let err = svc.generate_answer("missing", "python", "u", false).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
