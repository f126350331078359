pub mod backends;
pub mod prompts;

use crate::models::{DegradeReason, JudgmentVerdict, Recommendation};
use crate::traits::JudgeBackend;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::warn;

pub use backends::{HttpJudgeBackend, Provider};

#[derive(Debug, Clone, PartialEq)]
pub enum Judgment {
    Parsed(JudgmentVerdict),
    Degraded {
        verdict: JudgmentVerdict,
        reason: DegradeReason,
    },
}

impl Judgment {
    pub fn verdict(&self) -> &JudgmentVerdict {
        match self {
            Judgment::Parsed(verdict) | Judgment::Degraded { verdict, .. } => verdict,
        }
    }

    pub fn degradation(&self) -> Option<&DegradeReason> {
        match self {
            Judgment::Parsed(_) => None,
            Judgment::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn into_parts(self) -> (JudgmentVerdict, Option<DegradeReason>) {
        match self {
            Judgment::Parsed(verdict) => (verdict, None),
            Judgment::Degraded { verdict, reason } => (verdict, Some(reason)),
        }
    }
}

pub struct StructuredJudgeClient<B> {
    backend: B,
    timeout: Duration,
}

impl<B> StructuredJudgeClient<B>
where
    B: JudgeBackend,
{
    pub fn new(backend: B, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Never fails. Backend errors, timeouts and unparseable replies become a
    /// degraded verdict scored at `vector_score` (similarity x 100).
    pub async fn judge(&self, job_description: &str, resume_text: &str, vector_score: f64) -> Judgment {
        let prompt = prompts::screening_prompt(job_description, resume_text);
        let call = self
            .backend
            .generate_structured_judgment(prompts::SYSTEM_INSTRUCTION, &prompt);

        let raw = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(error)) => {
                let reason = DegradeReason::Backend(error.to_string());
                warn!(backend = self.backend.name(), %reason, "degraded verdict");
                return Judgment::Degraded {
                    verdict: JudgmentVerdict::degraded(
                        vector_score,
                        format!("AI analysis failed: {error}"),
                    ),
                    reason,
                };
            }
            Err(_) => {
                let reason = DegradeReason::Timeout(self.timeout);
                warn!(backend = self.backend.name(), %reason, "degraded verdict");
                return Judgment::Degraded {
                    verdict: JudgmentVerdict::degraded(
                        vector_score,
                        format!("AI analysis failed: {reason}"),
                    ),
                    reason,
                };
            }
        };

        match parse_verdict(&raw, vector_score) {
            Ok(verdict) => Judgment::Parsed(verdict),
            Err(reason) => {
                warn!(backend = self.backend.name(), %reason, "degraded verdict");
                let reasoning = match &reason {
                    DegradeReason::NoJsonFound => raw,
                    other => format!("AI analysis failed: {other}"),
                };
                Judgment::Degraded {
                    verdict: JudgmentVerdict::degraded(vector_score, reasoning),
                    reason,
                }
            }
        }
    }
}

/// Greedy: first `{` through last `}`.
pub fn extract_json_region(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

pub fn parse_verdict(raw: &str, fallback_score: f64) -> Result<JudgmentVerdict, DegradeReason> {
    let region = extract_json_region(raw).ok_or(DegradeReason::NoJsonFound)?;
    let value: Value = serde_json::from_str(region)
        .map_err(|error| DegradeReason::InvalidJson(error.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(DegradeReason::InvalidJson("expected a JSON object".to_string()));
    };

    Ok(JudgmentVerdict {
        overall_score: score_field(&fields, fallback_score),
        strengths: list_field(&fields, "strengths"),
        weaknesses: list_field(&fields, "weaknesses"),
        matched_requirements: list_field(&fields, "matched_requirements"),
        missing_requirements: list_field(&fields, "missing_requirements"),
        recommendation: fields
            .get("recommendation")
            .and_then(Value::as_str)
            .map(Recommendation::from_label)
            .unwrap_or_default(),
        reasoning: match fields.get("reasoning") {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        },
    })
}

fn score_field(fields: &Map<String, Value>, fallback: f64) -> f64 {
    let score = match fields.get("overall_score") {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    };
    score
        .filter(|score| score.is_finite())
        .unwrap_or(fallback)
        .clamp(0.0, 100.0)
}

fn list_field(fields: &Map<String, Value>, name: &str) -> Vec<String> {
    match fields.get(name) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(Value::String(text)) if !text.trim().is_empty() => vec![text.clone()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BackendError;
    use async_trait::async_trait;

    struct FakeBackend {
        reply: Result<&'static str, u16>,
        delay: Duration,
    }

    impl FakeBackend {
        fn replying(reply: &'static str) -> Self {
            Self {
                reply: Ok(reply),
                delay: Duration::ZERO,
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl JudgeBackend for FakeBackend {
        fn name(&self) -> &str {
            "fake"
        }

        async fn generate_structured_judgment(
            &self,
            _system_instruction: &str,
            _user_instruction: &str,
        ) -> Result<String, BackendError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match self.reply {
                Ok(text) => Ok(text.to_string()),
                Err(status) => Err(BackendError::Api {
                    status,
                    message: "invalid api key".to_string(),
                }),
            }
        }
    }

    fn client(backend: FakeBackend) -> StructuredJudgeClient<FakeBackend> {
        StructuredJudgeClient::new(backend, Duration::from_secs(5))
    }

    #[test]
    fn json_region_is_greedy_across_prose() {
        let text = "Here you go:\n{\"a\": {\"b\": 1}}\nThanks!";
        assert_eq!(extract_json_region(text), Some("{\"a\": {\"b\": 1}}"));
        assert_eq!(extract_json_region("no braces"), None);
        assert_eq!(extract_json_region("} backwards {"), None);
    }

    #[test]
    fn full_verdict_is_parsed() {
        let raw = r#"Sure! {"overall_score": 82, "strengths": ["Rust"], "weaknesses": [],
            "matched_requirements": ["async"], "missing_requirements": ["k8s"],
            "recommendation": "hire", "reasoning": "Strong fit"} done"#;
        let verdict = parse_verdict(raw, 10.0).unwrap();
        assert_eq!(verdict.overall_score, 82.0);
        assert_eq!(verdict.strengths, vec!["Rust"]);
        assert_eq!(verdict.missing_requirements, vec!["k8s"]);
        assert_eq!(verdict.recommendation, Recommendation::Hire);
        assert_eq!(verdict.reasoning, "Strong fit");
    }

    #[test]
    fn missing_fields_take_defaults() {
        let verdict = parse_verdict("{\"strengths\": \"Communication\"}", 37.5).unwrap();
        assert_eq!(verdict.overall_score, 37.5);
        assert_eq!(verdict.strengths, vec!["Communication"]);
        assert!(verdict.weaknesses.is_empty());
        assert_eq!(verdict.recommendation, Recommendation::Maybe);
        assert_eq!(verdict.reasoning, "");
    }

    #[test]
    fn string_and_out_of_range_scores_are_coerced() {
        assert_eq!(parse_verdict("{\"overall_score\": \"75%\"}", 0.0).unwrap().overall_score, 75.0);
        assert_eq!(parse_verdict("{\"overall_score\": 140}", 0.0).unwrap().overall_score, 100.0);
        assert_eq!(parse_verdict("{\"overall_score\": -3}", 0.0).unwrap().overall_score, 0.0);
    }

    #[test]
    fn truncated_json_has_no_region() {
        let raw = "{\"overall_score\": 80, \"strengths\": [\"Rust\"";
        assert_eq!(parse_verdict(raw, 50.0), Err(DegradeReason::NoJsonFound));
    }

    #[test]
    fn broken_json_inside_braces_is_invalid() {
        let result = parse_verdict("{\"overall_score\": 80,, }", 50.0);
        assert!(matches!(result, Err(DegradeReason::InvalidJson(_))));
    }

    #[tokio::test]
    async fn parsed_reply_is_not_degraded() {
        let judge = client(FakeBackend::replying(
            "{\"overall_score\": 90, \"recommendation\": \"HIRE\", \"reasoning\": \"ok\"}",
        ));
        let judgment = judge.judge("job", "resume", 40.0).await;
        assert!(judgment.degradation().is_none());
        assert_eq!(judgment.verdict().overall_score, 90.0);
        assert_eq!(judgment.verdict().recommendation, Recommendation::Hire);
    }

    #[tokio::test]
    async fn backend_error_degrades_to_vector_score() {
        let judge = client(FakeBackend::failing(401));
        let judgment = judge.judge("job", "resume", 55.5).await;

        let verdict = judgment.verdict();
        assert_eq!(verdict.overall_score, 55.5);
        assert_eq!(verdict.recommendation, Recommendation::Maybe);
        assert!(verdict.reasoning.starts_with("AI analysis failed:"));
        assert!(matches!(judgment.degradation(), Some(DegradeReason::Backend(_))));
    }

    #[tokio::test]
    async fn prose_only_reply_keeps_raw_text_as_reasoning() {
        let judge = client(FakeBackend::replying("I cannot evaluate this resume."));
        let judgment = judge.judge("job", "resume", 12.0).await;

        assert_eq!(judgment.verdict().reasoning, "I cannot evaluate this resume.");
        assert_eq!(judgment.verdict().overall_score, 12.0);
        assert_eq!(judgment.degradation(), Some(&DegradeReason::NoJsonFound));
    }

    #[tokio::test]
    async fn slow_backend_times_out_into_degraded_verdict() {
        let backend = FakeBackend {
            reply: Ok("{\"overall_score\": 99}"),
            delay: Duration::from_secs(5),
        };
        let judge = StructuredJudgeClient::new(backend, Duration::from_millis(20));
        let judgment = judge.judge("job", "resume", 33.0).await;

        assert_eq!(judgment.verdict().overall_score, 33.0);
        assert!(matches!(judgment.degradation(), Some(DegradeReason::Timeout(_))));
    }
}
