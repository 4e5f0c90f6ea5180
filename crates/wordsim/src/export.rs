//! `wordsim export`: materialize a pretrained model at the served path

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;
use wordsim_common::{available_models, find_model, AppConfig, ModelManager};
use wordsim_vector::{load_word2vec_format, save_word2vec_format, LoadOptions, WordVectors};

/// Export arguments resolved from the CLI
pub struct ExportOptions {
    pub model: String,
    pub output: PathBuf,
    pub source: Option<PathBuf>,
    pub source_binary: bool,
    pub sha256: Option<String>,
    pub force: bool,
}

/// Catalog lines for `export --list`, marking archives already cached
pub async fn list(config: &AppConfig) -> Result<Vec<String>> {
    let manager = ModelManager::new(config.models_dir.clone())?;
    let cached = manager.list_cached_archives().await?;

    Ok(available_models()
        .iter()
        .map(|model| {
            format!(
                "{:<34} {:>4}d  {:>8.1} MB  {}{}",
                model.name,
                model.dimension,
                model.size_mb(),
                if model.format.is_binary() { "binary" } else { "text" },
                if cached.contains(&model.name) { "  [cached]" } else { "" }
            )
        })
        .collect())
}

pub async fn run(config: &AppConfig, options: ExportOptions) -> Result<PathBuf> {
    if options.output.exists() && !options.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            options.output.display()
        );
    }

    let (archive, binary, expected_dim) = match &options.source {
        Some(source) => (source.clone(), options.source_binary, None),
        None => {
            let model = find_model(&options.model)?;
            let manager = ModelManager::new(config.models_dir.clone())?;
            let archive = manager.ensure_archive(&model).await?;

            let expected = options.sha256.as_deref().or(model.sha256.as_deref());
            if !manager.verify_archive(&archive, expected).await? {
                bail!("Checksum verification failed for {}", archive.display());
            }

            (archive, model.format.is_binary(), Some(model.dimension))
        }
    };

    let output = options.output.clone();
    tokio::task::spawn_blocking(move || convert(&archive, binary, expected_dim, &output))
        .await
        .context("export task panicked")??;

    Ok(options.output)
}

/// Load `source` and write it as word2vec binary to `output`
fn convert(source: &Path, binary: bool, expected_dim: Option<usize>, output: &Path) -> Result<()> {
    let load_options = LoadOptions {
        binary,
        limit: None,
    };
    let store = load_word2vec_format(source, &load_options)
        .with_context(|| format!("Failed to read {}", source.display()))?;

    if let Some(expected) = expected_dim {
        if store.dim() != expected {
            bail!(
                "{} has dimension {}, catalog says {}",
                source.display(),
                store.dim(),
                expected
            );
        }
    }

    info!(
        "Converting {} vectors (dimension {}) to {}",
        store.len(),
        store.dim(),
        output.display()
    );
    save_word2vec_format(&store, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(())
}
