use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::errors::AssistError;
use crate::wire::{CompletionText, RequestPayload};

/// OpenAI-compatible `/chat/completions` client (OpenRouter by default).
pub struct ChatCompletions {
    api_base: String,
    api_key: Option<String>,
    client: Client,
    timeout: Option<Duration>,
}

impl ChatCompletions {
    pub fn new(api_base: String, api_key: Option<String>, timeout_secs: u64) -> Self {
        Self {
            api_base,
            api_key,
            client: Client::new(),
            timeout: super::timeout_of(timeout_secs),
        }
    }
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[async_trait]
impl super::CompletionClient for ChatCompletions {
    async fn complete(&self, model: &str, payload: &RequestPayload) -> Result<CompletionText, AssistError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AssistError::remote("chat API key is not set (OPENROUTER_API_KEY)"))?;

        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let body = json!({
            "model": model,
            "messages": payload.messages(),
        });
        tracing::debug!(%url, model, persona = ?payload.persona, "POST chat completion");

        let mut req = self.client.post(&url).bearer_auth(api_key).json(&body);
        if let Some(t) = self.timeout {
            req = req.timeout(t);
        }
        let resp = req.send().await?;

        let status = resp.status();
        let text = resp.text().await?;
        tracing::debug!(%status, bytes = text.len(), "chat completion response");

        if !status.is_success() {
            return Err(AssistError::remote(format!("chat API error ({}): {}", status, text)));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| AssistError::remote(format!("failed to parse chat response: {e}\nRaw: {text}")))?;

        let raw_text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AssistError::remote("chat response has no choices"))?;

        Ok(CompletionText { raw_text })
    }
}
