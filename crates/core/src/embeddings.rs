use crate::ScreeningError;

const DEFAULT: usize = 384;

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = DEFAULT;

pub trait Embedder: Send + Sync {
    fn dimensions(&self) -> usize;

    fn model_tag(&self) -> String;

    fn embed(&self, text: &str) -> Result<Vec<f32>, ScreeningError>;
}

#[derive(Debug, Clone, Copy)]
pub struct CharacterNgramEmbedder {
    pub dimensions: usize,
}

impl Default for CharacterNgramEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}

impl Embedder for CharacterNgramEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_tag(&self) -> String {
        format!("char-trigram-fnv1a-v1/{}", self.dimensions.max(1))
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, ScreeningError> {
        let mut vector = vec![0f32; self.dimensions.max(1)];
        let lowered = text.to_lowercase();
        let chars: Vec<char> = lowered.chars().collect();

        if chars.is_empty() {
            return Ok(vector);
        }

        for window in chars.windows(3) {
            let token = window.iter().collect::<String>();
            let mut hash = 1469598103934665603u64;
            for byte in token.bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(1099511628211);
            }
            let bucket = (hash % vector.len() as u64) as usize;
            vector[bucket] += 1.0;
        }

        let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        Ok(vector)
    }
}

/// Returns `0.0` when either vector has zero magnitude or the lengths differ.
pub fn cosine_similarity(left: &[f32], right: &[f32]) -> f64 {
    if left.len() != right.len() || left.is_empty() {
        return 0.0;
    }

    let mut dot = 0f64;
    let mut left_norm = 0f64;
    let mut right_norm = 0f64;
    for (a, b) in left.iter().zip(right) {
        let (a, b) = (f64::from(*a), f64::from(*b));
        dot += a * b;
        left_norm += a * a;
        right_norm += b * b;
    }

    if left_norm == 0.0 || right_norm == 0.0 {
        return 0.0;
    }

    (dot / (left_norm.sqrt() * right_norm.sqrt())).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::{cosine_similarity, CharacterNgramEmbedder, Embedder};

    #[test]
    fn embedder_is_deterministic() {
        let embedder = CharacterNgramEmbedder::default();
        let first = embedder.embed("Senior Rust engineer, 6 years").unwrap();
        let second = embedder.embed("Senior Rust engineer, 6 years").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn embedder_outputs_expected_length() {
        let embedder = CharacterNgramEmbedder { dimensions: 32 };
        let vector = embedder.embed("abc").unwrap();
        assert_eq!(vector.len(), 32);
    }

    #[test]
    fn short_text_embeds_to_zero_vector() {
        let embedder = CharacterNgramEmbedder { dimensions: 16 };
        let vector = embedder.embed("ab").unwrap();
        assert!(vector.iter().all(|value| *value == 0.0));
    }

    #[test]
    fn model_tag_tracks_dimensions() {
        let small = CharacterNgramEmbedder { dimensions: 64 };
        let large = CharacterNgramEmbedder { dimensions: 128 };
        assert_ne!(small.model_tag(), large.model_tag());
    }

    #[test]
    fn self_similarity_is_maximal() {
        let embedder = CharacterNgramEmbedder::default();
        let vector = embedder.embed("distributed systems in Rust").unwrap();
        assert!((cosine_similarity(&vector, &vector) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn similarity_is_symmetric() {
        let embedder = CharacterNgramEmbedder::default();
        let a = embedder.embed("backend developer with SQL").unwrap();
        let b = embedder.embed("frontend developer with React").unwrap();
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn zero_vectors_have_zero_similarity() {
        let zero = vec![0f32; 4];
        let other = vec![1f32, 0.0, 0.0, 0.0];
        assert_eq!(cosine_similarity(&zero, &other), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn mismatched_lengths_have_zero_similarity() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }
}
