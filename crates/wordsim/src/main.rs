use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wordsim_common::{logger, AppConfig};
use wordsim_server::AppState;
use wordsim_vector::{load_word2vec_format, score_detailed, LoadOptions};

mod export;

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            break;
        }
    }

    None
}

/// Load .env file from project root
fn load_dotenv_from_project_root() {
    if let Some(root) = find_project_root() {
        let env_path = root.join(".env");
        if env_path.exists() {
            dotenv::from_path(&env_path).ok();
        }
    } else {
        dotenv::dotenv().ok();
    }
}

#[derive(Parser)]
#[command(name = "wordsim")]
#[command(about = "wordsim - text similarity from averaged word embeddings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the model and start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,

        /// Word2vec model file
        #[arg(long)]
        model_path: Option<PathBuf>,
    },

    /// Download a pretrained model and write it to the model path
    Export {
        /// Pretrained model name (defaults to MODEL_NAME)
        #[arg(long)]
        model: Option<String>,

        /// Destination file (defaults to MODEL_PATH)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Convert a local word2vec file instead of downloading
        #[arg(long)]
        source: Option<PathBuf>,

        /// The local source uses the text layout
        #[arg(long, requires = "source")]
        text: bool,

        /// Expected SHA256 of the downloaded archive
        #[arg(long)]
        sha256: Option<String>,

        /// Overwrite an existing output file
        #[arg(long)]
        force: bool,

        /// List downloadable models and exit
        #[arg(long)]
        list: bool,
    },

    /// Score two texts once and print the result
    Score {
        /// First text
        #[arg(long)]
        text1: String,

        /// Second text
        #[arg(long)]
        text2: String,

        /// Word2vec model file
        #[arg(long)]
        model_path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env before AppConfig so CLI overrides below win
    load_dotenv_from_project_root();

    match cli.command {
        Some(Commands::Serve {
            host,
            port,
            model_path,
        }) => {
            if let Some(host) = &host {
                std::env::set_var("SERVER_HOST", host);
            }
            if let Some(port) = port {
                std::env::set_var("SERVER_PORT", port.to_string());
            }
            if let Some(path) = &model_path {
                std::env::set_var("MODEL_PATH", path);
            }

            serve(AppConfig::from_env()?).await?;
        }
        Some(Commands::Export {
            model,
            output,
            source,
            text,
            sha256,
            force,
            list,
        }) => {
            let config = AppConfig::from_env()?;
            config.validate()?;
            logger::setup_console_logging(&config.log_level)?;

            if list {
                for line in export::list(&config).await? {
                    println!("{}", line);
                }
                return Ok(());
            }

            let options = export::ExportOptions {
                model: model.unwrap_or_else(|| config.model_name.clone()),
                output: output.unwrap_or_else(|| config.model_path.clone()),
                source,
                source_binary: !text,
                sha256,
                force,
            };

            let written = export::run(&config, options).await?;
            println!("Model written to {}", written.display());
        }
        Some(Commands::Score {
            text1,
            text2,
            model_path,
        }) => {
            if let Some(path) = &model_path {
                std::env::set_var("MODEL_PATH", path);
            }

            let config = AppConfig::from_env()?;
            config.validate()?;
            logger::setup_console_logging(&config.log_level)?;

            let options = LoadOptions {
                binary: config.model_binary,
                limit: config.model_limit,
            };
            let store = load_word2vec_format(&config.model_path, &options)?;
            let detail = score_detailed(&text1, &text2, &store);

            println!("similarity: {}", detail.similarity.value());
            println!(
                "known words: {} / {}{}",
                detail.known_tokens1,
                detail.known_tokens2,
                if detail.similarity.is_defined() {
                    ""
                } else {
                    " (no similarity: a text has no known words)"
                }
            );
        }
        None => {
            serve(AppConfig::from_env()?).await?;
        }
    }

    Ok(())
}

async fn serve(config: AppConfig) -> Result<()> {
    config.validate()?;
    logger::setup_logging(&config.log_dir, &config.log_level)?;

    tracing::info!("wordsim starting...");
    tracing::info!("  Bind: {}", config.server_bind_address());
    tracing::info!("  Model: {}", config.model_path.display());

    // A missing or corrupt model is fatal
    let state = AppState::load(config).await?;

    wordsim_server::start_server(state).await?;

    Ok(())
}
