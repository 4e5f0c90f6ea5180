use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// POST /similarity request body
#[derive(Debug, Deserialize, Serialize)]
pub struct SimilarityRequest {
    pub text1: String,
    pub text2: String,
}

/// POST /similarity response body
#[derive(Debug, Deserialize, Serialize)]
pub struct SimilarityResponse {
    pub similarity: f32,
}

/// GET /health response body
#[derive(Debug, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub vocab_size: usize,
    pub dimension: usize,
    pub model_path: String,
    pub loaded_at: DateTime<Utc>,
}

/// Error response body
#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}
