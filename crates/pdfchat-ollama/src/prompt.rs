//! Prompt assembly for document-grounded answers

use pdfchat_core::{ChatExchange, RetrievedChunk};

const SYSTEM_PROMPT: &str = "You're a helpful research assistant who answers questions based on provided research documents.
Follow these guidelines STRICTLY:

1. Provide detailed, coherent answers in natural paragraphs.
2. ALWAYS include specific citations in the format: [Document: filename, Page: X]
3. If the context includes section headings, chapter numbers, or reference information, cite those as well (e.g., [Document: filename, Page: X, Section: Y] or [Document: filename, Chapter: Z, Page: X]).
4. If the information comes from a reference section, cite it as such (e.g., [Document: filename, Page: X, Reference: ...]).
5. If the document doesn't contain relevant information, state that clearly.
6. Maintain a professional, clear style.
7. Only answer based on the provided documents.

EXAMPLE CITATIONS:
- [Document: research.pdf, Page: 5]
- [Document: manual.pdf, Pages: 12, 15]
- [Document: rep.pdf, Page: 3, Section: Introduction]
- [Document: paper.pdf, Page: 6, Section: 1.2]
- [Document: experiment.pdf, Page: 1, Section: A]
- [Document: predict.pdf, Page: 4, Section: II]
";

const RULE: &str = "==================================================";

/// Builds the full prompt sent to the model
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    max_context_chars: usize,
    history_turns: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            max_context_chars: 1000,
            history_turns: 3,
        }
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble instructions, retrieved passages, recent turns and the question
    pub fn build(&self, question: &str, context: &[RetrievedChunk], history: &[ChatExchange]) -> String {
        let mut parts: Vec<String> = vec![SYSTEM_PROMPT.to_string()];

        if !context.is_empty() {
            parts.push("\n=== CONTEXT DOCUMENTS ===".to_string());
            for (i, chunk) in context.iter().enumerate() {
                let filename = chunk.filename().unwrap_or("Unknown");
                let page = chunk
                    .page_number()
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "N/A".to_string());
                parts.push(format!("\n--- Document {} [Document: {}, Page: {}] ---", i + 1, filename, page));
                parts.push(self.truncate(&chunk.content));
            }
            parts.push(RULE.to_string());
        }

        if !history.is_empty() {
            parts.push("\nPrevious Conversation:".to_string());
            let start = history.len().saturating_sub(self.history_turns);
            for exchange in &history[start..] {
                parts.push(format!("\nHuman: {}", exchange.human));
                parts.push(format!("Assistant: {}", exchange.assistant));
            }
            parts.push(format!("\n{}", RULE));
        }

        parts.push(format!("\nCurrent Question: {}", question));
        parts.push("\nAnswer based on the context provided above, with accurate citations:".to_string());

        parts.join("\n")
    }

    fn truncate(&self, content: &str) -> String {
        match content.char_indices().nth(self.max_context_chars) {
            Some((byte_idx, _)) => format!("{}...", &content[..byte_idx]),
            None => content.to_string(),
        }
    }
}
