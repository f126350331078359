use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub type Metadata = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Resumes,
    JobDescriptions,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Resumes, Collection::JobDescriptions];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Resumes => "resumes",
            Collection::JobDescriptions => "job_descriptions",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Hire,
    #[default]
    Maybe,
    Reject,
}

impl Recommendation {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "HIRE" => Recommendation::Hire,
            "REJECT" => Recommendation::Reject,
            _ => Recommendation::Maybe,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Recommendation::Hire => "HIRE",
            Recommendation::Maybe => "MAYBE",
            Recommendation::Reject => "REJECT",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JudgmentVerdict {
    pub overall_score: f64,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub matched_requirements: Vec<String>,
    pub missing_requirements: Vec<String>,
    pub recommendation: Recommendation,
    pub reasoning: String,
}

impl JudgmentVerdict {
    pub fn degraded(vector_score: f64, reasoning: impl Into<String>) -> Self {
        Self {
            overall_score: vector_score.clamp(0.0, 100.0),
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            matched_requirements: Vec::new(),
            missing_requirements: Vec::new(),
            recommendation: Recommendation::Maybe,
            reasoning: reasoning.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DegradeReason {
    Backend(String),
    Timeout(#[serde(with = "duration_millis")] Duration),
    NoJsonFound,
    InvalidJson(String),
}

impl fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradeReason::Backend(details) => write!(f, "judge backend call failed: {details}"),
            DegradeReason::Timeout(limit) => {
                write!(f, "judge backend timed out after {}ms", limit.as_millis())
            }
            DegradeReason::NoJsonFound => f.write_str("judge response contained no JSON object"),
            DegradeReason::InvalidJson(details) => {
                write!(f, "judge response was not valid JSON: {details}")
            }
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeInput {
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl ResumeInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.metadata
            .insert("filename".to_string(), serde_json::Value::String(filename.into()));
        self
    }

    pub fn filename(&self) -> Option<&str> {
        self.metadata.get("filename").and_then(serde_json::Value::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScreeningResult {
    pub resume_id: String,
    pub filename: String,
    pub score: f64,
    pub vector_similarity: f64,
    pub ai_score: f64,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub matched_requirements: Vec<String>,
    pub missing_requirements: Vec<String>,
    pub recommendation: Recommendation,
    pub reasoning: String,
    pub matched_skills: Vec<String>,
    pub experience_years: f64,
    /// Position within a ranked batch; `None` until [`crate::fusion::rank`] runs.
    pub rank: Option<usize>,
    pub model_used: String,
    pub degraded: Option<DegradeReason>,
    pub metadata: Metadata,
}

impl ScreeningResult {
    pub fn verdict(&self) -> JudgmentVerdict {
        JudgmentVerdict {
            overall_score: self.ai_score,
            strengths: self.strengths.clone(),
            weaknesses: self.weaknesses.clone(),
            matched_requirements: self.matched_requirements.clone(),
            missing_requirements: self.missing_requirements.clone(),
            recommendation: self.recommendation,
            reasoning: self.reasoning.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Embedding,
    Store,
    InputFormat,
    Cancelled,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchFailure {
    /// Zero-based position in the submitted batch; `None` for files rejected
    /// before screening started.
    pub index: Option<usize>,
    pub filename: String,
    pub kind: FailureKind,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub job_id: String,
    pub results: Vec<ScreeningResult>,
    pub failures: Vec<BatchFailure>,
    pub cancelled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendation_labels_are_lenient() {
        assert_eq!(Recommendation::from_label("hire"), Recommendation::Hire);
        assert_eq!(Recommendation::from_label(" REJECT "), Recommendation::Reject);
        assert_eq!(Recommendation::from_label("strong yes"), Recommendation::Maybe);
    }

    #[test]
    fn recommendation_serializes_uppercase() {
        let json = serde_json::to_string(&Recommendation::Hire).unwrap();
        assert_eq!(json, "\"HIRE\"");
    }

    #[test]
    fn degraded_verdict_is_empty_maybe() {
        let verdict = JudgmentVerdict::degraded(42.5, "backend down");
        assert_eq!(verdict.overall_score, 42.5);
        assert_eq!(verdict.recommendation, Recommendation::Maybe);
        assert!(verdict.strengths.is_empty() && verdict.missing_requirements.is_empty());
        assert_eq!(verdict.reasoning, "backend down");
    }

    #[test]
    fn degrade_reason_round_trips_through_json() {
        let reason = DegradeReason::Timeout(Duration::from_millis(1500));
        let json = serde_json::to_value(&reason).unwrap();
        assert_eq!(json["kind"], "timeout");
        assert_eq!(json["detail"], 1500);
        let back: DegradeReason = serde_json::from_value(json).unwrap();
        assert_eq!(back, reason);
    }

    #[test]
    fn resume_input_exposes_filename() {
        let input = ResumeInput::new("text").with_filename("jane.txt");
        assert_eq!(input.filename(), Some("jane.txt"));
        assert_eq!(ResumeInput::new("text").filename(), None);
    }
}
