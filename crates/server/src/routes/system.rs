use actix_web::{get, web, HttpResponse};
use std::sync::Arc;
use wordsim_vector::WordVectors;

use crate::state::AppState;
use crate::types::HealthResponse;

/// Model status
#[get("/health")]
pub async fn health(state: web::Data<Arc<AppState>>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        vocab_size: state.store.len(),
        dimension: state.store.dim(),
        model_path: state.config.model_path.display().to_string(),
        loaded_at: state.loaded_at,
    })
}
