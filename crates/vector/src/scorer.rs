//! Averaged word-embedding similarity
//!
//! Each text is split on whitespace, reduced to the words the store knows,
//! and averaged into a document vector. Two document vectors are compared
//! with cosine similarity.

use ndarray::{Array1, ArrayView1};
use tracing::debug;

use crate::store::WordVectors;

/// Outcome of comparing two texts
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Similarity {
    /// Cosine similarity of the two document vectors
    Measured(f32),
    /// At least one text had no known words
    Undefined,
}

impl Similarity {
    /// Score value; `Undefined` maps to 0.0
    pub fn value(self) -> f32 {
        match self {
            Self::Measured(score) => score,
            Self::Undefined => 0.0,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, Self::Measured(_))
    }
}

/// Similarity plus how many known words each text contributed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreDetail {
    pub similarity: Similarity,
    pub known_tokens1: usize,
    pub known_tokens2: usize,
}

/// Whitespace tokens of `text` present in the store, in text order
pub fn known_tokens<'a, W>(text: &'a str, store: &W) -> Vec<&'a str>
where
    W: WordVectors + ?Sized,
{
    text.split_whitespace()
        .filter(|token| store.contains(token))
        .collect()
}

/// Mean of the vectors of `tokens`, or `None` when no token is known
pub fn document_vector<W>(tokens: &[&str], store: &W) -> Option<Array1<f32>>
where
    W: WordVectors + ?Sized,
{
    let mut sum = Array1::<f32>::zeros(store.dim());
    let mut count = 0usize;

    for vector in tokens.iter().filter_map(|token| store.vector(token)) {
        sum += &ArrayView1::from(vector);
        count += 1;
    }

    if count == 0 {
        return None;
    }

    sum /= count as f32;
    Some(sum)
}

/// Compare two texts and report the outcome
pub fn score_detailed<W>(text1: &str, text2: &str, store: &W) -> ScoreDetail
where
    W: WordVectors + ?Sized,
{
    let words1 = known_tokens(text1, store);
    let words2 = known_tokens(text2, store);

    let similarity = match (document_vector(&words1, store), document_vector(&words2, store)) {
        (Some(vec1), Some(vec2)) => Similarity::Measured(store.cosine_similarity(
            vec1.as_slice().unwrap_or_default(),
            vec2.as_slice().unwrap_or_default(),
        )),
        _ => Similarity::Undefined,
    };

    debug!(
        known_tokens1 = words1.len(),
        known_tokens2 = words2.len(),
        ?similarity,
        "scored text pair"
    );

    ScoreDetail {
        similarity,
        known_tokens1: words1.len(),
        known_tokens2: words2.len(),
    }
}

/// Similarity of two texts in [-1, 1]; 0 when either text has no known words
pub fn score<W>(text1: &str, text2: &str, store: &W) -> f32
where
    W: WordVectors + ?Sized,
{
    score_detailed(text1, text2, store).similarity.value()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::cosine_similarity;
    use crate::store::{EmbeddingStore, EmbeddingStoreBuilder};

    fn store() -> EmbeddingStore {
        let mut builder = EmbeddingStoreBuilder::new(4);
        builder.push("king", &[0.8, 0.3, 0.1, 0.5]).unwrap();
        builder.push("queen", &[0.7, 0.4, 0.2, 0.6]).unwrap();
        builder.push("dog", &[0.1, 0.9, 0.3, 0.2]).unwrap();
        builder.push("cat", &[0.2, 0.8, 0.4, 0.1]).unwrap();
        builder.push("apple", &[0.5, 0.1, 0.9, 0.3]).unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_single_token_equals_word_cosine() {
        let store = store();
        let expected = cosine_similarity(store.vector("king").unwrap(), store.vector("queen").unwrap());
        assert_eq!(score("king", "queen", &store), expected);
    }

    #[test]
    fn test_empty_and_unknown_fall_back_to_zero() {
        let store = store();
        assert_eq!(score("", "queen", &store), 0.0);
        assert_eq!(score("queen", "   ", &store), 0.0);
        assert_eq!(score("xyzzyunknown", "queen", &store), 0.0);
        assert_eq!(score("foo bar", "baz", &store), 0.0);

        let detail = score_detailed("xyzzyunknown", "queen", &store);
        assert_eq!(detail.similarity, Similarity::Undefined);
        assert_eq!((detail.known_tokens1, detail.known_tokens2), (0, 1));
    }

    #[test]
    fn test_identical_texts() {
        let store = store();
        let s = score("dog cat apple", "dog cat apple", &store);
        assert!((s - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_symmetric_and_order_invariant() {
        let store = store();
        assert_eq!(score("king dog", "apple cat", &store), score("apple cat", "king dog", &store));
        assert_eq!(score("dog cat", "queen", &store), score("cat dog", "queen", &store));
    }

    #[test]
    fn test_unknown_tokens_are_ignored() {
        let store = store();
        assert_eq!(score("king the", "queen of", &store), score("king", "queen", &store));
        // no case folding or punctuation stripping
        assert_eq!(known_tokens("King king, king", &store), vec!["king"]);
    }

    #[test]
    fn test_document_vector_mean() {
        let store = store();
        let mean = document_vector(&["dog", "cat"], &store).unwrap();
        let expected = [0.15_f32, 0.85, 0.35, 0.15];
        for (got, want) in mean.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-6);
        }
        assert!(document_vector(&[], &store).is_none());
    }

    #[test]
    fn test_similarity_value() {
        assert_eq!(Similarity::Undefined.value(), 0.0);
        assert!(!Similarity::Undefined.is_defined());
        assert_eq!(Similarity::Measured(0.25).value(), 0.25);
    }
}
