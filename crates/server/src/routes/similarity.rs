use actix_web::{post, web, HttpResponse};
use std::sync::Arc;
use tracing::debug;
use wordsim_vector::score_detailed;

use crate::state::AppState;
use crate::types::{SimilarityRequest, SimilarityResponse};

/// Similarity of two texts from their averaged word vectors
#[post("/similarity")]
pub async fn similarity(
    body: web::Json<SimilarityRequest>,
    state: web::Data<Arc<AppState>>,
) -> HttpResponse {
    let detail = score_detailed(&body.text1, &body.text2, state.store.as_ref());

    if !detail.similarity.is_defined() {
        debug!(
            "No known words (text1: {}, text2: {}), returning 0",
            detail.known_tokens1, detail.known_tokens2
        );
    }

    HttpResponse::Ok().json(SimilarityResponse {
        similarity: detail.similarity.value(),
    })
}
