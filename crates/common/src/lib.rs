pub mod config;
pub mod error;
pub mod logger;
pub mod model_manager;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::WordSimError;
pub use model_manager::{available_models, find_model, ModelFormat, ModelManager, PretrainedModel};
pub type Result<T> = std::result::Result<T, WordSimError>;
