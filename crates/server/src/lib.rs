//! wordsim HTTP server
//!
//! Actix-web REST API around the similarity scorer

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;
use wordsim_common::Result;

pub mod error;
pub mod routes;
pub mod state;
pub mod types;

pub use error::ApiError;
pub use state::AppState;

/// Bind and run the server until shutdown
pub async fn start_server(state: AppState) -> Result<()> {
    let bind_addr = state.config.server_bind_address();
    let max_payload_bytes = state.config.max_payload_bytes;
    let state = web::Data::new(Arc::new(state));

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .configure(|cfg| routes::configure(cfg, max_payload_bytes))
    })
    .bind(&bind_addr)?;

    info!("Server listening on http://{}", bind_addr);
    server.run().await?;

    info!("Server stopped");
    Ok(())
}
