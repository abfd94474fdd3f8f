//! Interactive command parsing

/// A line typed at the `you>` prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractiveCommand {
    Quit,
    ClearHistory,
    Info,
    Help,
    Sources(String),
    Save(Option<String>),
    Load(String),
    Ask(String),
    Empty,
}

impl InteractiveCommand {
    /// Keywords are case-insensitive; arguments keep their case
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return Self::Empty;
        }

        let (head, rest) = match input.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (input, ""),
        };

        match (head.to_lowercase().as_str(), rest.is_empty()) {
            ("quit" | "exit", true) => Self::Quit,
            ("clear", true) => Self::ClearHistory,
            ("info", true) => Self::Info,
            ("help", true) => Self::Help,
            ("sources", false) => Self::Sources(rest.to_string()),
            ("save", true) => Self::Save(None),
            ("save", false) => Self::Save(Some(rest.to_string())),
            ("load", false) => Self::Load(rest.to_string()),
            _ => Self::Ask(input.to_string()),
        }
    }
}
