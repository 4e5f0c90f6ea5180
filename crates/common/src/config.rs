use crate::error::WordSimError;
use crate::model_manager::ModelManager;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default location of the materialized embedding model
pub const DEFAULT_MODEL_PATH: &str = "models/GoogleNews-vectors-negative300.bin";

/// Default pretrained model exported by `wordsim export`
pub const DEFAULT_MODEL_NAME: &str = "word2vec-google-news-300";

/// Default request body limit (256 MiB)
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 256 * 1024 * 1024;

/// wordsim application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Word2vec model file served by the similarity endpoint
    pub model_path: PathBuf,

    /// Whether the model file uses the binary word2vec layout
    pub model_binary: bool,

    /// Read at most this many vectors from the model file
    pub model_limit: Option<usize>,

    /// Pretrained model name used by the export command
    pub model_name: String,

    /// Download cache for pretrained model archives
    pub models_dir: PathBuf,

    /// Server bind address
    pub server_host: String,

    /// Server port
    pub server_port: u16,

    /// Largest accepted JSON request body in bytes
    pub max_payload_bytes: usize,

    /// Log directory
    pub log_dir: PathBuf,

    /// Log level
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            model_binary: true,
            model_limit: None,
            model_name: DEFAULT_MODEL_NAME.to_string(),
            models_dir: ModelManager::default_models_dir(),
            server_host: "127.0.0.1".to_string(),
            server_port: 5000,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            log_dir: PathBuf::from("./log"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, WordSimError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let config = Self {
            model_path: Self::get_env_path("MODEL_PATH")
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
            model_binary: std::env::var("MODEL_BINARY")
                .ok()
                .and_then(|s| parse_bool(&s))
                .unwrap_or(true),
            model_limit: std::env::var("MODEL_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok()),
            model_name: std::env::var("MODEL_NAME")
                .unwrap_or_else(|_| DEFAULT_MODEL_NAME.to_string()),
            models_dir: Self::get_env_path("WORDSIM_MODELS_DIR")
                .unwrap_or_else(ModelManager::default_models_dir),
            server_host: std::env::var("SERVER_HOST")
                .unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5000),
            max_payload_bytes: std::env::var("MAX_PAYLOAD_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_PAYLOAD_BYTES),
            log_dir: Self::get_env_path("LOG_DIR")
                .unwrap_or_else(|| PathBuf::from("./log")),
            log_level: std::env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "info".to_string()),
        };

        // Ensure required directories exist
        config.ensure_directories()?;

        Ok(config)
    }

    /// Get PathBuf from environment variable
    fn get_env_path(key: &str) -> Option<PathBuf> {
        std::env::var(key).ok().map(PathBuf::from)
    }

    /// Ensure required directories exist, create if not
    pub fn ensure_directories(&self) -> Result<(), WordSimError> {
        let mut dirs = vec![self.log_dir.clone()];
        if let Some(parent) = self.model_path.parent() {
            if !parent.as_os_str().is_empty() {
                dirs.push(parent.to_path_buf());
            }
        }

        for dir in dirs {
            if !dir.exists() {
                std::fs::create_dir_all(&dir).map_err(|e| {
                    WordSimError::config(format!(
                        "Failed to create directory {}: {}",
                        dir.display(),
                        e
                    ))
                })?;
            }
        }

        Ok(())
    }

    /// Get server bind address (host:port)
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), WordSimError> {
        if self.model_path.as_os_str().is_empty() {
            return Err(WordSimError::config("Model path cannot be empty"));
        }

        if self.model_name.is_empty() {
            return Err(WordSimError::config("Model name cannot be empty"));
        }

        if self.model_limit == Some(0) {
            return Err(WordSimError::config("Model limit must be greater than 0"));
        }

        // Validate port range
        if self.server_port == 0 {
            return Err(WordSimError::config("Server port cannot be 0"));
        }

        if self.max_payload_bytes == 0 {
            return Err(WordSimError::config("Max payload size must be greater than 0"));
        }

        Ok(())
    }
}

/// Parse boolean-ish environment values ("1", "true", "yes", "on", ...)
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
