use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ========================================
/// Request/response shapes exchanged with the remote services
/// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    StepDecomposition,
    DirectCodegen,
    NodeAdjustment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tx {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub dry_run: bool,
}

impl Tx {
    pub fn new(dry_run: bool) -> Self {
        Self { id: Uuid::new_v4(), timestamp: Utc::now(), dry_run }
    }
}

/// System instruction, scene context and user instruction for one call.
/// Context and instruction end up in the same user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestPayload {
    pub persona: Persona,
    pub system_instruction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_summary: Option<String>,
    pub user_instruction: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Self { role: role.to_string(), content: content.into() }
    }
}

impl RequestPayload {
    /// Chat messages as sent: an optional system message followed by one
    /// user message carrying `Scene Overview` context ahead of the task.
    pub fn messages(&self) -> Vec<ChatMessage> {
        let mut out = Vec::with_capacity(2);
        if !self.system_instruction.is_empty() {
            out.push(ChatMessage::new("system", self.system_instruction.as_str()));
        }
        let user = match &self.context_summary {
            Some(ctx) => format!("Scene Overview:\n{}\n\nTask: {}", ctx, self.user_instruction),
            None => self.user_instruction.clone(),
        };
        out.push(ChatMessage::new("user", user));
        out
    }
}

/// Raw text of the first completion choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionText {
    pub raw_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub bytes: Bytes,
    pub mime_type: String,
}

/// Metadata recorded for an image call; the bytes themselves go to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRequest {
    pub prompt: String,
    pub output_format: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_prepended_to_task() {
        let payload = RequestPayload {
            persona: Persona::DirectCodegen,
            system_instruction: "sys".into(),
            context_summary: Some("Name: Cube, Type: MESH, Location: (0.0, 0.0, 0.0)".into()),
            user_instruction: "add a sphere".into(),
        };
        let msgs = payload.messages();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, "system");
        assert_eq!(
            msgs[1].content,
            "Scene Overview:\nName: Cube, Type: MESH, Location: (0.0, 0.0, 0.0)\n\nTask: add a sphere"
        );
    }

    #[test]
    fn empty_system_instruction_is_omitted() {
        let payload = RequestPayload {
            persona: Persona::NodeAdjustment,
            system_instruction: String::new(),
            context_summary: None,
            user_instruction: "raw".into(),
        };
        assert_eq!(payload.messages(), vec![ChatMessage::new("user", "raw")]);
    }
}
