//! wordsim vector layer
//!
//! Word embedding store, word2vec file codec and the averaged-embedding
//! similarity scorer.

pub mod scorer;
pub mod similarity;
pub mod store;
pub mod word2vec;

pub use scorer::{document_vector, known_tokens, score, score_detailed, ScoreDetail, Similarity};
pub use similarity::cosine_similarity;
pub use store::{EmbeddingStore, EmbeddingStoreBuilder, WordVectors};
pub use word2vec::{load_word2vec_format, read_word2vec, save_word2vec_format, write_word2vec, LoadOptions};
