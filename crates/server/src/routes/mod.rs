use actix_web::web;
use wordsim_common::WordSimError;

use crate::error::ApiError;

pub mod similarity;
pub mod system;

/// Register all routes and extractor configuration
///
/// `max_payload_bytes` bounds JSON request bodies.
pub fn configure(cfg: &mut web::ServiceConfig, max_payload_bytes: usize) {
    let json_config = web::JsonConfig::default()
        .limit(max_payload_bytes)
        .error_handler(|err, _req| {
            ApiError::from(WordSimError::invalid_input(err.to_string())).into()
        });

    cfg.app_data(json_config)
        .service(similarity::similarity)
        .service(system::health);
}
