//! Terminal interface for pdfchat

mod commands;
mod repl;
mod ui;


pub use commands::InteractiveCommand;
pub use repl::{Startup, load_startup_documents, run_interactive};
pub use ui::{display_banner, format_database_info, format_sources, handle_input_with_history, print_help};

// Re-export core types
pub use pdfchat_core::{Error, Result};
