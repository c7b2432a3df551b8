use crate::models::question::{ExampleTestCase, Question};
use rand::Rng;
use serde_json::json;

const FALLBACK_COUNT: usize = 5;

/// Picks one of the hand-authored questions uniformly at random, themed with `topic`.
pub fn pick_fallback(topic: Option<&str>) -> Question {
    let index = rand::thread_rng().gen_range(0..FALLBACK_COUNT);
    fallback_at(index, topic)
}

pub fn fallback_at(index: usize, topic: Option<&str>) -> Question {
    let theme = topic
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("Everyday");

    match index % FALLBACK_COUNT {
        0 => Question {
            qname: format!("{} Array Challenge", theme),
            description: format!(
                "You are given an array of integers recorded from a {} themed dataset. \
                 Return the sum of all elements. Your solution should handle large arrays \
                 and negative values efficiently.",
                theme
            ),
            constraints: vec![
                "1 <= array.length <= 10^4".to_string(),
                "-10^9 <= array[i] <= 10^9".to_string(),
            ],
            example_test_cases: vec![
                example(json!({ "array": [1, 2, 3, 4, 5] }), json!(15)),
                example(json!({ "array": [10, 20, 30] }), json!(60)),
            ],
        },
        1 => Question {
            qname: format!("{} String Manipulation", theme),
            description: format!(
                "A {} enthusiast writes every message backwards. Given a string, \
                 return it reversed. Consider empty strings and single characters.",
                theme
            ),
            constraints: vec![
                "1 <= string.length <= 1000".to_string(),
                "string contains only lowercase letters".to_string(),
            ],
            example_test_cases: vec![
                example(json!({ "str": "hello" }), json!("olleh")),
                example(json!({ "str": "world" }), json!("dlrow")),
            ],
        },
        2 => Question {
            qname: format!("{} Pair Finder", theme),
            description: format!(
                "In a {} inventory, each item has a value. Given an array of values and a \
                 target, return the indices of the two distinct items whose values add up \
                 to the target. Exactly one valid pair exists.",
                theme
            ),
            constraints: vec![
                "2 <= nums.length <= 10^4".to_string(),
                "-10^9 <= nums[i], target <= 10^9".to_string(),
                "Exactly one valid answer exists".to_string(),
            ],
            example_test_cases: vec![
                example(json!({ "nums": [2, 7, 11, 15], "target": 9 }), json!([0, 1])),
                example(json!({ "nums": [3, 2, 4], "target": 6 }), json!([1, 2])),
            ],
        },
        3 => Question {
            qname: format!("{} Balanced Brackets", theme),
            description: format!(
                "The {} club stores schedules as strings of brackets. Determine whether a \
                 string containing only '(', ')', '[', ']', '{{' and '}}' is balanced: every \
                 opening bracket is closed by the same type in the correct order.",
                theme
            ),
            constraints: vec![
                "1 <= s.length <= 10^4".to_string(),
                "s consists of bracket characters only".to_string(),
            ],
            example_test_cases: vec![
                example(json!({ "s": "()[]{}" }), json!(true)),
                example(json!({ "s": "([)]" }), json!(false)),
            ],
        },
        _ => Question {
            qname: format!("{} Longest Streak", theme),
            description: format!(
                "A {} tracker logs daily scores. Given an unsorted array of integers, return \
                 the length of the longest run of consecutive values. Aim for O(n) time.",
                theme
            ),
            constraints: vec![
                "0 <= nums.length <= 10^5".to_string(),
                "-10^9 <= nums[i] <= 10^9".to_string(),
            ],
            example_test_cases: vec![
                example(json!({ "nums": [100, 4, 200, 1, 3, 2] }), json!(4)),
                example(json!({ "nums": [0, 3, 7, 2, 5, 8, 4, 6, 0, 1] }), json!(9)),
            ],
        },
    }
}

fn example(input: serde_json::Value, output: serde_json::Value) -> ExampleTestCase {
    ExampleTestCase {
        input,
        output,
        explanation: None,
    }
}
