use crate::models::ScreeningResult;
use crate::ConfigError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_AI_WEIGHT: f64 = 0.7;
pub const DEFAULT_VECTOR_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    pub ai: f64,
    pub vector: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            ai: DEFAULT_AI_WEIGHT,
            vector: DEFAULT_VECTOR_WEIGHT,
        }
    }
}

impl FusionWeights {
    pub fn new(ai: f64, vector: f64) -> Result<Self, ConfigError> {
        let weights = Self { ai, vector };
        weights.validate()?;
        Ok(weights)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.ai.is_finite() || !self.vector.is_finite() {
            return Err(ConfigError::InvalidWeights(format!(
                "weights must be finite (ai={}, vector={})",
                self.ai, self.vector
            )));
        }
        if self.ai < 0.0 || self.vector < 0.0 {
            return Err(ConfigError::InvalidWeights(format!(
                "weights must be non-negative (ai={}, vector={})",
                self.ai, self.vector
            )));
        }
        if self.ai + self.vector == 0.0 {
            return Err(ConfigError::InvalidWeights(
                "at least one weight must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn fuse(&self, ai_score: f64, vector_similarity: f64) -> f64 {
        round2(ai_score * self.ai + vector_similarity * 100.0 * self.vector)
    }
}

pub fn fuse(ai_score: f64, vector_similarity: f64) -> f64 {
    FusionWeights::default().fuse(ai_score, vector_similarity)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn rank(mut results: Vec<ScreeningResult>) -> Vec<ScreeningResult> {
    results.sort_by(|left, right| right.score.total_cmp(&left.score));
    for (position, result) in results.iter_mut().enumerate() {
        result.rank = Some(position + 1);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Metadata, Recommendation};

    fn result(id: &str, score: f64) -> ScreeningResult {
        ScreeningResult {
            resume_id: id.to_string(),
            filename: format!("{id}.txt"),
            score,
            vector_similarity: 0.0,
            ai_score: 0.0,
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            matched_requirements: Vec::new(),
            missing_requirements: Vec::new(),
            recommendation: Recommendation::Maybe,
            reasoning: String::new(),
            matched_skills: Vec::new(),
            experience_years: 0.0,
            rank: None,
            model_used: "fake".to_string(),
            degraded: None,
            metadata: Metadata::new(),
        }
    }

    #[test]
    fn default_weights_blend_judge_and_vector_scores() {
        assert_eq!(fuse(80.0, 0.5), 71.0);
    }

    #[test]
    fn fusion_rounds_to_two_decimals() {
        assert_eq!(fuse(33.333, 0.12345), 27.04);
    }

    #[test]
    fn custom_weights_are_applied() {
        let weights = FusionWeights::new(0.5, 0.5).unwrap();
        assert_eq!(weights.fuse(80.0, 0.4), 60.0);
    }

    #[test]
    fn invalid_weights_are_rejected() {
        assert!(FusionWeights::new(-0.1, 1.0).is_err());
        assert!(FusionWeights::new(f64::NAN, 0.3).is_err());
        assert!(FusionWeights::new(0.0, 0.0).is_err());
    }

    #[test]
    fn ranks_are_a_permutation_in_descending_order() {
        let ranked = rank(vec![
            result("a", 40.0),
            result("b", 90.0),
            result("c", 65.5),
            result("d", 12.0),
        ]);

        let ids = ranked.iter().map(|r| r.resume_id.as_str()).collect::<Vec<_>>();
        let ranks = ranked.iter().filter_map(|r| r.rank).collect::<Vec<_>>();
        assert_eq!(ids, vec!["b", "c", "a", "d"]);
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn ties_keep_input_order() {
        let ranked = rank(vec![
            result("first", 50.0),
            result("top", 80.0),
            result("second", 50.0),
            result("third", 50.0),
        ]);

        let ids = ranked.iter().map(|r| r.resume_id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn ranking_empty_input_is_empty() {
        assert!(rank(Vec::new()).is_empty());
    }
}
