use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

const CONTENT_ID_BYTES: usize = 16;

fn disallowed_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s.,;:!?\-]").expect("static regex"))
}

pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let stripped = disallowed_chars().replace_all(text, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncated SHA-256. A deduplication key, not a security digest.
pub fn content_id(raw_text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_text.as_bytes());
    let digest = hasher.finalize();
    digest[..CONTENT_ID_BYTES]
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub raw_text: String,
    pub normalized_text: String,
}

impl Document {
    pub fn new(raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        Self {
            id: content_id(&raw_text),
            normalized_text: normalize(&raw_text),
            raw_text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_is_collapsed_and_trimmed() {
        let input = "  Senior   Rust\t\tengineer\n\nwith  tokio  ";
        assert_eq!(normalize(input), "Senior Rust engineer with tokio");
    }

    #[test]
    fn disallowed_characters_are_removed() {
        let input = "C++ & Rust (async) @ scale: 5+ years - remote!";
        assert_eq!(normalize(input), "C Rust async scale: 5 years - remote!");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\t "), "");
        assert_eq!(normalize("@#$%"), "");
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            "a @ b",
            "Résumé — Jürgen Müller, 10 yrs; Kubernetes/Docker.",
            "\u{a0}tabs\tand\u{2003}em spaces ",
            "{\"json\": [1, 2]}",
            "",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "input: {sample:?}");
        }
    }

    #[test]
    fn content_id_is_stable_and_content_addressed() {
        let first = content_id("Jane Doe, Rust developer");
        let second = content_id("Jane Doe, Rust developer");
        let other = content_id("John Doe, Go developer");
        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(first.len(), CONTENT_ID_BYTES * 2);
    }

    #[test]
    fn document_id_hashes_raw_text() {
        let document = Document::new("Python  &  SQL");
        assert_eq!(document.id, content_id("Python  &  SQL"));
        assert_eq!(document.normalized_text, "Python SQL");
    }
}
