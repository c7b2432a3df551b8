use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A generated (or fallback) DSA practice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub qname: String,
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_constraints")]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub example_test_cases: Vec<ExampleTestCase>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleTestCase {
    #[serde(default)]
    pub input: JsonValue,
    #[serde(default)]
    pub output: JsonValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    /// Both the title and the description must carry text.
    pub fn is_complete(&self) -> bool {
        !self.qname.trim().is_empty() && !self.description.trim().is_empty()
    }
}

/// Accepts a list of rules, a `{name: rule}` map, a single string or null and
/// always yields an ordered list of strings.
fn deserialize_constraints<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = JsonValue::deserialize(deserializer)?;
    Ok(normalize_constraints(raw))
}

pub fn normalize_constraints(raw: JsonValue) -> Vec<String> {
    match raw {
        JsonValue::Null => Vec::new(),
        JsonValue::String(s) => {
            if s.trim().is_empty() {
                Vec::new()
            } else {
                vec![s]
            }
        }
        JsonValue::Array(items) => items.into_iter().map(value_to_text).collect(),
        JsonValue::Object(map) => map
            .into_iter()
            .map(|(key, value)| format!("{}: {}", key, value_to_text(value)))
            .collect(),
        other => vec![other.to_string()],
    }
}

fn value_to_text(value: JsonValue) -> String {
    match value {
        JsonValue::String(s) => s,
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn random() -> Self {
        *Self::ALL
            .choose(&mut rand::thread_rng())
            .unwrap_or(&Difficulty::Medium)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("Unknown difficulty '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct StoredQuestion {
    pub id: Uuid,
    pub qid: String,
    pub data: Json<Question>,
    pub topic: Option<String>,
    pub difficulty: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn map_shaped_constraints_are_flattened_in_order() {
        let q: Question = serde_json::from_value(json!({
            "qname": "Orbit Sums",
            "description": "Sum the orbits.",
            "constraints": { "n": "1 <= n <= 10^5", "values": "-10^9 <= v <= 10^9" },
            "example_test_cases": []
        }))
        .unwrap();
        assert_eq!(
            q.constraints,
            vec!["n: 1 <= n <= 10^5".to_string(), "values: -10^9 <= v <= 10^9".to_string()]
        );
    }

    #[test]
    fn missing_optional_fields_default() {
        let q: Question =
            serde_json::from_value(json!({ "qname": "X", "description": "Y" })).unwrap();
        assert!(q.constraints.is_empty());
        assert!(q.example_test_cases.is_empty());
        assert!(q.is_complete());
    }

    #[test]
    fn test_case_values_pass_through_opaquely() {
        let q: Question = serde_json::from_value(json!({
            "qname": "X",
            "description": "Y",
            "constraints": "1 <= n",
            "example_test_cases": [ { "input": { "nums": [1, 2] }, "output": 3 }, { "input": "abc" } ]
        }))
        .unwrap();
        assert_eq!(q.constraints, vec!["1 <= n".to_string()]);
        assert_eq!(q.example_test_cases[0].input, json!({ "nums": [1, 2] }));
        assert_eq!(q.example_test_cases[0].output, json!(3));
        assert_eq!(q.example_test_cases[1].output, JsonValue::Null);
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("impossible".parse::<Difficulty>().is_err());
        assert!(Difficulty::ALL.contains(&Difficulty::random()));
    }
}
