//! Model Manager for pretrained embedding archives
//!
//! Downloads gensim-data word vector archives into a local cache and
//! verifies them before they are exported to the served model path.

use crate::{Result, WordSimError};
use futures::{Stream, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, warn};

const GENSIM_DATA_BASE_URL: &str =
    "https://github.com/RaRe-Technologies/gensim-data/releases/download";

/// On-disk layout of the vectors inside an archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// word2vec binary (header line + raw little-endian f32 rows)
    Binary,
    /// word2vec text (header line + one whitespace separated row per word)
    Text,
}

impl ModelFormat {
    pub fn is_binary(self) -> bool {
        matches!(self, Self::Binary)
    }
}

/// Pretrained model information
#[derive(Debug, Clone)]
pub struct PretrainedModel {
    /// Model name (e.g., "word2vec-google-news-300")
    pub name: String,

    /// Compressed archive size in bytes
    pub size: u64,

    /// SHA256 hash for verification
    pub sha256: Option<String>,

    /// Download URL
    pub url: String,

    /// Vector layout inside the archive
    pub format: ModelFormat,

    /// Vector dimension
    pub dimension: usize,
}

impl PretrainedModel {
    fn gensim_data(name: &str, size: u64, format: ModelFormat, dimension: usize) -> Self {
        Self {
            name: name.to_string(),
            size,
            sha256: None,
            url: format!("{}/{}/{}.gz", GENSIM_DATA_BASE_URL, name, name),
            format,
            dimension,
        }
    }

    /// Get archive filename
    pub fn filename(&self) -> String {
        format!("{}.gz", self.name)
    }

    /// Get size in MB
    pub fn size_mb(&self) -> f64 {
        self.size as f64 / 1024.0 / 1024.0
    }
}

/// Available pretrained models
pub fn available_models() -> Vec<PretrainedModel> {
    vec![
        PretrainedModel::gensim_data(
            "word2vec-google-news-300",
            1_743_563_840,
            ModelFormat::Binary,
            300,
        ),
        PretrainedModel::gensim_data("glove-wiki-gigaword-50", 69_182_535, ModelFormat::Text, 50),
        PretrainedModel::gensim_data("glove-wiki-gigaword-100", 128_105_134, ModelFormat::Text, 100),
        PretrainedModel::gensim_data("glove-wiki-gigaword-300", 394_362_229, ModelFormat::Text, 300),
        PretrainedModel::gensim_data(
            "fasttext-wiki-news-subwords-300",
            1_005_007_116,
            ModelFormat::Text,
            300,
        ),
    ]
}

/// Look up a pretrained model by name
pub fn find_model(name: &str) -> Result<PretrainedModel> {
    available_models()
        .into_iter()
        .find(|m| m.name == name)
        .ok_or_else(|| WordSimError::not_found(format!("Unknown pretrained model: {}", name)))
}

/// Model Manager
pub struct ModelManager {
    models_dir: PathBuf,
    client: Client,
}

impl ModelManager {
    /// Create new model manager
    pub fn new(models_dir: PathBuf) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(3600)) // 1 hour for large downloads
            .build()
            .map_err(|e| WordSimError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { models_dir, client })
    }

    /// Get default models directory
    pub fn default_models_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("WORDSIM_MODELS_DIR") {
            return PathBuf::from(dir);
        }

        #[cfg(target_os = "linux")]
        {
            if let Some(home) = std::env::var_os("HOME") {
                return PathBuf::from(home).join(".cache/wordsim/models");
            }
        }

        #[cfg(target_os = "macos")]
        {
            if let Some(home) = std::env::var_os("HOME") {
                return PathBuf::from(home).join("Library/Caches/wordsim/models");
            }
        }

        #[cfg(target_os = "windows")]
        {
            if let Some(local_app_data) = std::env::var_os("LOCALAPPDATA") {
                return PathBuf::from(local_app_data).join("wordsim\\models");
            }
        }

        // Fallback
        PathBuf::from("models")
    }

    /// Cached archive path for a model
    pub fn archive_path(&self, model: &PretrainedModel) -> PathBuf {
        self.models_dir.join(model.filename())
    }

    /// Ensure the model archive is cached, download if missing
    pub async fn ensure_archive(&self, model: &PretrainedModel) -> Result<PathBuf> {
        let archive_path = self.archive_path(model);

        if archive_path.exists() {
            info!("Archive already cached: {}", archive_path.display());
            return Ok(archive_path);
        }

        info!("Archive not cached, downloading: {}", model.name);
        self.download_archive(model, &archive_path).await?;

        Ok(archive_path)
    }

    /// Download archive from URL
    pub async fn download_archive(&self, model: &PretrainedModel, dest: &Path) -> Result<()> {
        info!(
            "Downloading {} ({:.1} MB) from {}",
            model.filename(),
            model.size_mb(),
            model.url
        );

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }

        let pb = ProgressBar::new(model.size);
        let style = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .map_err(|e| WordSimError::internal(format!("Invalid progress template: {}", e)))?
            .progress_chars("#>-");
        pb.set_style(style);

        let response = self
            .client
            .get(&model.url)
            .send()
            .await
            .map_err(|e| WordSimError::network(format!("Failed to download: {}", e)))?;

        if !response.status().is_success() {
            return Err(WordSimError::network(format!(
                "Download failed with status: {}",
                response.status()
            )));
        }

        // Write to temporary file first
        let temp_path = dest.with_extension("gz.tmp");
        write_stream_to_file(response.bytes_stream(), &temp_path, &pb).await?;
        pb.finish_with_message("Download complete");

        let metadata = fs::metadata(&temp_path).await?;
        if metadata.len() < model.size / 2 {
            fs::remove_file(&temp_path).await?;
            return Err(WordSimError::network(format!(
                "Downloaded file is too small ({} bytes, expected ~{} bytes)",
                metadata.len(),
                model.size
            )));
        }

        fs::rename(&temp_path, dest).await?;

        info!("Download successful: {}", dest.display());

        Ok(())
    }

    /// Verify archive integrity
    ///
    /// Without an expected hash only existence is checked.
    pub async fn verify_archive(&self, path: &Path, expected_hash: Option<&str>) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }

        let Some(expected) = expected_hash else {
            return Ok(true);
        };

        info!("Verifying archive: {}", path.display());

        let hash = sha256_file(path).await?;
        let matches = hash.eq_ignore_ascii_case(expected.trim());
        if !matches {
            warn!("Checksum mismatch for {}: expected {}, got {}", path.display(), expected, hash);
        }

        Ok(matches)
    }

    /// List cached archives (model names)
    pub async fn list_cached_archives(&self) -> Result<Vec<String>> {
        if !self.models_dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.models_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("gz") {
                if let Some(name) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        debug!("Cached archives in {}: {:?}", self.models_dir.display(), names);

        Ok(names)
    }
}

/// Write a byte stream to `path`, removing the partial file on failure
async fn write_stream_to_file<S, B, E>(stream: S, path: &Path, pb: &ProgressBar) -> Result<u64>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let written = async {
        let mut file = fs::File::create(path).await?;
        let mut downloaded: u64 = 0;
        futures::pin_mut!(stream);

        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| WordSimError::network(format!("Download error: {}", e)))?;
            let chunk = chunk.as_ref();
            file.write_all(chunk).await?;
            downloaded += chunk.len() as u64;
            pb.set_position(downloaded);
        }

        file.sync_all().await?;
        Ok::<u64, WordSimError>(downloaded)
    }
    .await;

    if written.is_err() {
        let _ = fs::remove_file(path).await;
    }
    written
}

/// Streamed SHA256 of a file, hex encoded
async fn sha256_file(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 1 << 20];

    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_models() {
        let models = available_models();
        assert!(models.len() >= 5);
        let google = find_model("word2vec-google-news-300").unwrap();
        assert_eq!(google.format, ModelFormat::Binary);
        assert_eq!(google.dimension, 300);
        assert!(find_model("no-such-model").is_err());
    }

    #[test]
    fn test_model_filename_and_url() {
        let model = find_model("glove-wiki-gigaword-50").unwrap();
        assert_eq!(model.filename(), "glove-wiki-gigaword-50.gz");
        assert_eq!(
            model.url,
            "https://github.com/RaRe-Technologies/gensim-data/releases/download/glove-wiki-gigaword-50/glove-wiki-gigaword-50.gz"
        );
        assert!(!model.format.is_binary());
    }

    #[test]
    fn test_default_models_dir() {
        let dir = ModelManager::default_models_dir();
        assert!(!dir.to_string_lossy().is_empty());
    }

    #[tokio::test]
    async fn test_verify_archive() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tiny.gz");
        std::fs::write(&path, b"abc").unwrap();

        let manager = ModelManager::new(tmp.path().to_path_buf()).unwrap();
        // sha256("abc")
        let expected = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
        assert!(manager.verify_archive(&path, Some(expected)).await.unwrap());
        assert!(manager.verify_archive(&path, None).await.unwrap());
        assert!(!manager.verify_archive(&path, Some("00")).await.unwrap());
        assert!(!manager
            .verify_archive(&tmp.path().join("missing.gz"), None)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_interrupted_stream_removes_partial_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("model.gz.tmp");
        let chunks: Vec<std::result::Result<Vec<u8>, String>> =
            vec![Ok(b"first chunk".to_vec()), Err("connection reset".to_string())];

        let err = write_stream_to_file(futures::stream::iter(chunks), &path, &ProgressBar::hidden())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("connection reset"));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_complete_stream_is_written() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("model.gz.tmp");
        let chunks: Vec<std::result::Result<Vec<u8>, String>> =
            vec![Ok(b"abc".to_vec()), Ok(b"def".to_vec())];

        let written = write_stream_to_file(futures::stream::iter(chunks), &path, &ProgressBar::hidden())
            .await
            .unwrap();
        assert_eq!(written, 6);
        assert_eq!(std::fs::read(&path).unwrap(), b"abcdef");
    }

    #[tokio::test]
    async fn test_list_cached_archives() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("glove-wiki-gigaword-50.gz"), b"x").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), b"x").unwrap();

        let manager = ModelManager::new(tmp.path().to_path_buf()).unwrap();
        let names = manager.list_cached_archives().await.unwrap();
        assert_eq!(names, vec!["glove-wiki-gigaword-50".to_string()]);

        let model = find_model("glove-wiki-gigaword-50").unwrap();
        let cached = manager.ensure_archive(&model).await.unwrap();
        assert_eq!(cached, tmp.path().join("glove-wiki-gigaword-50.gz"));
    }
}
