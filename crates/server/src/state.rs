use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;
use wordsim_common::{AppConfig, Result, WordSimError};
use wordsim_vector::{load_word2vec_format, EmbeddingStore, LoadOptions, WordVectors};

/// Shared application state
///
/// Built once before the server binds; never mutated afterwards.
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Loaded word vectors
    pub store: Arc<EmbeddingStore>,

    /// When the model finished loading
    pub loaded_at: DateTime<Utc>,
}

impl AppState {
    /// Wrap an already loaded store
    pub fn new(config: AppConfig, store: Arc<EmbeddingStore>) -> Self {
        Self {
            config,
            store,
            loaded_at: Utc::now(),
        }
    }

    /// Load the configured model on a blocking thread
    pub async fn load(config: AppConfig) -> Result<Self> {
        let path = config.model_path.clone();
        let options = LoadOptions {
            binary: config.model_binary,
            limit: config.model_limit,
        };

        let store = tokio::task::spawn_blocking(move || load_word2vec_format(&path, &options))
            .await
            .map_err(|e| WordSimError::internal(format!("Model loader panicked: {}", e)))??;

        info!(
            "Model ready: {} words, dimension {}",
            store.len(),
            store.dim()
        );

        Ok(Self::new(config, Arc::new(store)))
    }
}
