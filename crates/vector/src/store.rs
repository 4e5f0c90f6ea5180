use ndarray::{Array2, ArrayView2};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use wordsim_common::{Result, WordSimError};

use crate::similarity::cosine_similarity;

/// Read-only word → vector lookup used by the scorer
pub trait WordVectors {
    /// Vector dimension
    fn dim(&self) -> usize;

    /// Vector for a known word
    fn vector(&self, word: &str) -> Option<&[f32]>;

    /// Membership test
    fn contains(&self, word: &str) -> bool {
        self.vector(word).is_some()
    }

    /// Cosine similarity between two vectors of this store's dimension
    fn cosine_similarity(&self, a: &[f32], b: &[f32]) -> f32 {
        cosine_similarity(a, b)
    }
}

/// Immutable embedding table
///
/// Rows of `vectors` are indexed by the vocabulary map; `words[i]` is the
/// word stored in row `i`, in file order.
#[derive(Debug, Clone)]
pub struct EmbeddingStore {
    vocab: HashMap<String, usize>,
    words: Vec<String>,
    vectors: Array2<f32>,
}

impl EmbeddingStore {
    /// Number of words
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words in row order
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Full vector matrix (one row per word)
    pub fn vectors(&self) -> ArrayView2<'_, f32> {
        self.vectors.view()
    }
}

impl WordVectors for EmbeddingStore {
    fn dim(&self) -> usize {
        self.vectors.ncols()
    }

    fn vector(&self, word: &str) -> Option<&[f32]> {
        let row = *self.vocab.get(word)?;
        self.vectors.row(row).to_slice()
    }

    fn contains(&self, word: &str) -> bool {
        self.vocab.contains_key(word)
    }
}

/// Incremental builder used by the word2vec reader
#[derive(Debug)]
pub struct EmbeddingStoreBuilder {
    dim: usize,
    vocab: HashMap<String, usize>,
    words: Vec<String>,
    data: Vec<f32>,
}

impl EmbeddingStoreBuilder {
    pub fn new(dim: usize) -> Self {
        Self::with_capacity(dim, 0)
    }

    pub fn with_capacity(dim: usize, words: usize) -> Self {
        Self {
            dim,
            vocab: HashMap::with_capacity(words),
            words: Vec::with_capacity(words),
            data: Vec::with_capacity(words.saturating_mul(dim)),
        }
    }

    /// Add a word. Returns `Ok(false)` when the word is already present;
    /// the first vector is kept.
    pub fn push(&mut self, word: impl Into<String>, vector: &[f32]) -> Result<bool> {
        if vector.len() != self.dim {
            return Err(WordSimError::model(format!(
                "vector has {} components, expected {}",
                vector.len(),
                self.dim
            )));
        }

        match self.vocab.entry(word.into()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                self.words.push(slot.key().clone());
                slot.insert(self.words.len() - 1);
                self.data.extend_from_slice(vector);
                Ok(true)
            }
        }
    }

    pub fn build(self) -> Result<EmbeddingStore> {
        if self.dim == 0 {
            return Err(WordSimError::model("vector dimension must be greater than 0"));
        }

        let vectors = Array2::from_shape_vec((self.words.len(), self.dim), self.data)
            .map_err(|e| WordSimError::model(format!("invalid vector matrix: {}", e)))?;

        Ok(EmbeddingStore {
            vocab: self.vocab,
            words: self.words,
            vectors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> EmbeddingStore {
        let mut builder = EmbeddingStoreBuilder::new(3);
        builder.push("king", &[0.5, 0.2, 0.1]).unwrap();
        builder.push("queen", &[0.4, 0.3, 0.2]).unwrap();
        builder.push("apple", &[-0.3, 0.9, 0.0]).unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_lookup() {
        let store = sample_store();
        assert_eq!(store.len(), 3);
        assert_eq!(store.dim(), 3);
        assert!(store.contains("queen"));
        assert!(!store.contains("Queen"));
        assert_eq!(store.vector("apple"), Some(&[-0.3, 0.9, 0.0][..]));
        assert_eq!(store.vector("pear"), None);
        assert_eq!(store.words(), &["king", "queen", "apple"]);
    }

    #[test]
    fn test_duplicate_keeps_first() {
        let mut builder = EmbeddingStoreBuilder::new(2);
        assert!(builder.push("dog", &[1.0, 0.0]).unwrap());
        assert!(!builder.push("dog", &[0.0, 1.0]).unwrap());
        let store = builder.build().unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.vector("dog"), Some(&[1.0, 0.0][..]));
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut builder = EmbeddingStoreBuilder::new(2);
        assert!(builder.push("dog", &[1.0, 0.0, 3.0]).is_err());
        assert!(EmbeddingStoreBuilder::new(0).build().is_err());
    }
}
