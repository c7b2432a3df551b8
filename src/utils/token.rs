use chrono::Utc;
use rand::Rng;

/// Opaque question id: millisecond timestamp followed by a six digit random suffix.
pub fn generate_qid() -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{}{:06}", Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qid_is_numeric_and_unique_enough() {
        let a = generate_qid();
        let b = generate_qid();
        assert!(a.chars().all(|c| c.is_ascii_digit()));
        assert!(a.len() >= 19);
        assert_ne!(a, b);
    }
}
