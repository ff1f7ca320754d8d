//! Pulls the code fragment out of a chat completion.
//!
//! A fence is three backticks. The opening fence may carry a language tag
//! (a single word filling the rest of its line). The body runs to the next three
//! backticks. Only the first block is returned.

const FENCE: &str = "```";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Fenced { language: Option<String>, code: String },
    /// No complete fenced block; the whole text, trimmed.
    Fallback(String),
}

impl Extraction {
    pub fn code(&self) -> &str {
        match self {
            Extraction::Fenced { code, .. } => code,
            Extraction::Fallback(code) => code,
        }
    }

    pub fn into_code(self) -> String {
        match self {
            Extraction::Fenced { code, .. } => code,
            Extraction::Fallback(code) => code,
        }
    }

    pub fn is_fenced(&self) -> bool {
        matches!(self, Extraction::Fenced { .. })
    }
}

pub fn extract(text: &str) -> Extraction {
    let Some(open) = text.find(FENCE) else {
        return Extraction::Fallback(text.trim().to_string());
    };
    let after_open = &text[open + FENCE.len()..];

    // A language tag is a lone word filling the rest of the fence line.
    let (tag, body_start) = match after_open.split_once('\n') {
        Some((line, rest)) if is_tag(line.trim_end()) => (Some(line.trim_end().to_string()), rest),
        _ => (None, after_open),
    };

    match body_start.find(FENCE) {
        Some(close) => Extraction::Fenced {
            language: tag,
            code: body_start[..close].trim().to_string(),
        },
        None => Extraction::Fallback(text.trim().to_string()),
    }
}

fn is_tag(line: &str) -> bool {
    !line.is_empty() && !line.contains(|c: char| c.is_whitespace() || c == '`')
}

pub fn extract_code(text: &str) -> String {
    extract(text).into_code()
}
