use anyhow::Result;
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use pdfchat_cli::{Startup, load_startup_documents, run_interactive};
use pdfchat_core::{AppConfig, Embedder, EmbeddingProvider, LLMProvider};
use pdfchat_ollama::{OllamaClient, OllamaConfig};
use pdfchat_rag::{HashEmbedder, RagChatbot};

#[derive(Debug, Parser)]
#[command(name = "pdfchat")]
#[command(about = "Ask questions about your PDF documents with a local Ollama model", long_about = None)]
struct Cli {
    /// Launch the web interface instead of the terminal chat
    #[arg(long)]
    web: bool,

    /// Web server host (overrides WEB_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Web server port (overrides WEB_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// PDF file or directory to load before starting
    #[arg(long, value_name = "PATH")]
    load_docs: Option<PathBuf>,

    /// Clear the vector database and exit
    #[arg(long)]
    clear_db: bool,

    /// Ollama model to answer with (overrides OLLAMA_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Ollama server URL (overrides OLLAMA_BASE_URL)
    #[arg(long, value_name = "URL")]
    ollama_url: Option<String>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(url) = &self.ollama_url {
            config.ollama_base_url = url.clone();
        }
        if let Some(host) = &self.host {
            config.web_host = host.clone();
        }
        if let Some(port) = self.port {
            config.web_port = port;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env()?;
    cli.apply_overrides(&mut config);
    config.validate()?;
    config.ensure_dirs()?;
    tracing::info!("Configuration loaded");

    let ollama = Arc::new(OllamaClient::new(OllamaConfig::from_app_config(&config))?);
    ollama.connect().await?;

    let embedder: Arc<dyn Embedder> = match config.embedding_provider {
        EmbeddingProvider::Ollama => ollama.clone(),
        EmbeddingProvider::Hash => Arc::new(HashEmbedder::default()),
    };
    let chatbot = RagChatbot::open(config.clone(), ollama, embedder).await?;

    if cli.clear_db {
        println!("Clearing vector database...");
        chatbot.clear_database().await?;
        println!("{} Database cleared!", "✅".green());
        return Ok(());
    }

    if cli.web {
        if let Some(path) = &cli.load_docs {
            let summary = chatbot.load_documents(path).await?;
            println!(
                "{} Loaded {} documents ({} chunks)",
                "✅".green(),
                summary.documents,
                summary.chunks
            );
        }
        println!(
            "{} Web interface on http://{}:{}",
            "🌐".blue(),
            config.web_host,
            config.web_port
        );
        pdfchat_web::serve(Arc::new(chatbot), &config.web_host, config.web_port).await?;
        return Ok(());
    }

    if load_startup_documents(&chatbot, cli.load_docs.as_deref()).await? == Startup::NothingToLoad {
        return Ok(());
    }

    run_interactive(&chatbot).await?;
    Ok(())
}
