//! Interactive terminal session

use colored::*;
use std::io::{self, Write};
use std::path::Path;
use tracing::{error, warn};

use pdfchat_core::{Result, VectorStore};
use pdfchat_rag::RagChatbot;

use crate::commands::InteractiveCommand;
use crate::ui::{display_banner, format_database_info, format_sources, handle_input_with_history, print_help};

const SOURCES_TOP_K: usize = 3;

/// What startup loading left us with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Startup {
    Ready,
    NothingToLoad,
}

fn dir_has_entries(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

/// Load `--load-docs` if given (failure aborts), otherwise the documents
/// directory when it has content (failure only warns).
pub async fn load_startup_documents<V: VectorStore>(
    chatbot: &RagChatbot<V>,
    load_docs: Option<&Path>,
) -> Result<Startup> {
    if let Some(path) = load_docs {
        println!("Loading documents from: {}", path.display());
        let summary = chatbot.load_documents(path).await?;
        println!(
            "{} Documents loaded successfully! ({} documents, {} chunks)",
            "✅".green(),
            summary.documents,
            summary.chunks
        );
        return Ok(Startup::Ready);
    }

    let documents_dir = chatbot.config().documents_dir();
    if dir_has_entries(&documents_dir) {
        println!("Loading documents from default directory: {}", documents_dir.display());
        match chatbot.load_documents(&documents_dir).await {
            Ok(summary) => println!(
                "{} Loaded {} documents ({} chunks)",
                "✅".green(),
                summary.documents,
                summary.chunks
            ),
            Err(e) => {
                warn!("Failed to load documents from default directory: {}", e);
                println!("{} Failed to load documents from default directory: {}", "⚠️".yellow(), e);
            }
        }
        return Ok(Startup::Ready);
    }

    if chatbot.is_initialized() {
        return Ok(Startup::Ready);
    }

    println!("No documents found in {}", documents_dir.display());
    println!("Please add documents to the documents directory or specify a path with --load-docs");
    Ok(Startup::NothingToLoad)
}

/// Run the prompt loop until `quit` or end of input
pub async fn run_interactive<V: VectorStore>(chatbot: &RagChatbot<V>) -> Result<()> {
    display_banner(chatbot.llm().model_id());

    let top_k = chatbot.config().top_k;
    let mut history = Vec::new();

    loop {
        let Some(input) = handle_input_with_history(&mut history).await? else {
            println!("{}", "👋 Goodbye!".green());
            break;
        };

        match InteractiveCommand::parse(&input) {
            InteractiveCommand::Empty => continue,
            InteractiveCommand::Quit => {
                println!("{}", "👋 Goodbye!".green());
                break;
            }
            InteractiveCommand::Help => print_help(),
            InteractiveCommand::ClearHistory => {
                chatbot.clear_chat_history().await;
                println!("{} Chat history cleared!", "✅".green());
            }
            InteractiveCommand::Info => match chatbot.get_database_info().await {
                Ok(info) => println!("\n{}", format_database_info(&info)),
                Err(e) => report(&e),
            },
            InteractiveCommand::Sources(query) => match chatbot.get_relevant_sources(&query, SOURCES_TOP_K).await {
                Ok(sources) => println!("\n{}", format_sources(&query, &sources)),
                Err(e) => report(&e),
            },
            InteractiveCommand::Save(name) => match chatbot.save_chat_history(name.as_deref()).await {
                Ok(path) => println!("{} Chat history saved to {}", "✅".green(), path.display()),
                Err(e) => report(&e),
            },
            InteractiveCommand::Load(path) => match chatbot.load_chat_history(Path::new(&path)).await {
                Ok(()) => println!("{} Chat history loaded from {}", "✅".green(), path),
                Err(e) => report(&e),
            },
            InteractiveCommand::Ask(question) => {
                print!("\n{} ", "bot>".cyan().bold());
                io::stdout().flush()?;

                let mut on_chunk = |chunk: &str| {
                    print!("{}", chunk);
                    let _ = io::stdout().flush();
                };
                let outcome = chatbot.stream_chat(&question, top_k, &mut on_chunk).await;
                println!();

                if let Err(e) = outcome {
                    report(&e);
                }
            }
        }
    }

    Ok(())
}

fn report(e: &pdfchat_core::Error) {
    error!("Error in main loop: {}", e);
    println!("{} Error: {}", "❌".red(), e);
}
