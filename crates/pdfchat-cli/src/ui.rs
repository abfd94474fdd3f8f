//! UI utilities for the CLI

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use std::io::{self, IsTerminal, Write};

use pdfchat_core::{DatabaseInfo, Result, RetrievedChunk};

const PROMPT: &str = "you>";
const PREVIEW_CHARS: usize = 100;

/// Display startup banner
pub fn display_banner(model: &str) {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = std::cmp::min(67, terminal_width.saturating_sub(4)).max(40);

    let top_border = format!("┌{}┐", "─".repeat(banner_width - 2));
    let bottom_border = format!("└{}┘", "─".repeat(banner_width - 2));
    let empty_line = format!("│{}│", " ".repeat(banner_width - 2));

    println!();
    println!("{}", top_border.blue());
    println!("{}", empty_line.blue());

    let title = "pdfchat - Ask your PDFs";
    let title_line = format!(
        "│  {}{}│",
        title.blue().bold(),
        " ".repeat(banner_width.saturating_sub(title.chars().count() + 4))
    );
    println!("{}", title_line);

    println!("{}", empty_line.blue());

    let footer = format!("Model: {} • served by Ollama", model);
    let feature_lines = [
        "Answers cite [Document: file, Page: N]",
        "",
        "Commands:",
        "• sources <query>  show matching passages",
        "• info             collection status",
        "• clear            forget the conversation",
        "• save [name] / load <path>  chat history",
        "• ↑/↓              input history",
        "",
        footer.as_str(),
    ];

    for line in feature_lines {
        if line.is_empty() {
            println!("{}", empty_line.blue());
            continue;
        }
        let padding = " ".repeat(banner_width.saturating_sub(line.chars().count() + 4));
        let content = if line.starts_with("Model:") {
            format!("│  {}{}│", line.dimmed(), padding)
        } else {
            format!("│  {}{}│", line, padding)
        };
        println!("{}", content.blue());
    }

    println!("{}", empty_line.blue());
    println!("{}", bottom_border.blue());
    println!();
    println!(
        "{}",
        "💡 Tip: Ask a question about your documents, or type 'help' for commands".dimmed()
    );
    println!();
}

/// Read one line with ↑/↓ history navigation. `None` means end of input.
pub async fn handle_input_with_history(history: &mut Vec<String>) -> Result<Option<String>> {
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        let input = input.trim().to_string();
        if !input.is_empty() {
            history.push(input.clone());
        }
        return Ok(Some(input));
    }

    enable_raw_mode()?;
    let result = read_raw_line(history);
    disable_raw_mode()?;
    println!();

    let line = result?;
    if let Some(input) = &line {
        if !input.is_empty() {
            history.push(input.clone());
        }
    }
    Ok(line)
}

fn redraw(input: &str) -> Result<()> {
    print!("\r{} {}  \r{} {}", PROMPT.green().bold(), " ".repeat(input.chars().count() + 50), PROMPT.green().bold(), input);
    io::stdout().flush()?;
    Ok(())
}

fn read_raw_line(history: &[String]) -> Result<Option<String>> {
    let mut input = String::new();
    let mut history_index: Option<usize> = None;

    print!("{} ", PROMPT.green().bold());
    io::stdout().flush()?;

    loop {
        let Event::Key(key_event) = event::read()? else {
            continue;
        };

        match key_event.code {
            KeyCode::Char('c' | 'd') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(None);
            }
            KeyCode::Enter => return Ok(Some(input)),
            KeyCode::Char(c) => {
                input.push(c);
                print!("{}", c);
                io::stdout().flush()?;
            }
            KeyCode::Backspace => {
                if input.pop().is_some() {
                    redraw(&input)?;
                }
            }
            KeyCode::Up => {
                if !history.is_empty() {
                    let new_index = match history_index {
                        None => history.len() - 1,
                        Some(idx) if idx > 0 => idx - 1,
                        Some(idx) => idx,
                    };
                    history_index = Some(new_index);
                    input = history[new_index].clone();
                    redraw(&input)?;
                }
            }
            KeyCode::Down => {
                if let Some(idx) = history_index {
                    if idx + 1 < history.len() {
                        history_index = Some(idx + 1);
                        input = history[idx + 1].clone();
                    } else {
                        history_index = None;
                        input.clear();
                    }
                    redraw(&input)?;
                }
            }
            KeyCode::Esc => {
                input.clear();
                redraw(&input)?;
            }
            _ => {}
        }
    }
}

/// Display help message
pub fn print_help() {
    println!("{}", "Available commands:".bold());
    println!("  {} - Ask a question about the loaded documents", "<question>".green());
    println!("  {} - Show the passages that best match a query", "sources <query>".green());
    println!("  {} - Show collection and session information", "info".green());
    println!("  {} - Clear the chat history", "clear".green());
    println!("  {} - Save the chat history as JSON", "save [name]".green());
    println!("  {} - Load a saved chat history", "load <path>".green());
    println!("  {} - Show this help message", "help".green());
    println!("  {} - Exit the application", "exit/quit".green());
    println!();
    println!("{}", "Examples:".bold());
    println!("  What are the main findings of the paper?");
    println!("  sources evaluation metrics");
}

pub fn format_database_info(info: &DatabaseInfo) -> String {
    format!(
        "Database Info:\n- Collection: {}\n- Documents: {}\n- Location: {}\n- Initialized: {}\n- Chat History: {} exchanges",
        info.name, info.document_count, info.persist_directory, info.is_initialized, info.chat_history_length
    )
}

fn preview(content: &str) -> String {
    let mut text: String = content.chars().take(PREVIEW_CHARS).collect();
    text.push_str("...");
    text
}

pub fn format_sources(query: &str, sources: &[RetrievedChunk]) -> String {
    if sources.is_empty() {
        return format!("No relevant sources for: '{}'", query);
    }

    let mut lines = vec![format!("Relevant sources for: '{}'", query)];
    for (i, source) in sources.iter().enumerate() {
        let page = source.page_number().map(|p| format!(" (page {})", p)).unwrap_or_default();
        lines.push(format!("{}. {}{}", i + 1, source.filename().unwrap_or("Unknown"), page));
        let distance = source
            .distance
            .map(|d| format!("{:.4}", d))
            .unwrap_or_else(|| "N/A".to_string());
        lines.push(format!("   Distance: {}", distance));
        lines.push(format!("   Content preview: {}", preview(&source.content)));
    }
    lines.join("\n")
}
