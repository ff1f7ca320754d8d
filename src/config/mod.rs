use anyhow::{Context, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::script::OpKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schema_version: String,
    /// Base URL of an OpenAI-compatible chat-completions API.
    pub chat_api_base: String,
    pub chat_api_key: Option<String>,
    /// Model for the step-by-step breakdown.
    pub reasoning_model: String,
    /// Model for scene scripts and node adjustments.
    pub codegen_model: String,
    pub image_endpoint: String,
    pub image_api_key: Option<String>,
    pub image_output_format: String,
    /// Operations a generated script may use.
    pub op_allowlist: Vec<OpKind>,
    pub max_ops: usize,
    pub texture_dir: String,
    /// Where per-transaction request/response artifacts go.
    pub artifact_root: String,
    /// 0 disables the request timeout.
    pub timeout_secs: u64,
    pub auto_approve: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: "2025-06-01".into(),
            chat_api_base: "https://openrouter.ai/api/v1".into(),
            chat_api_key: None,
            reasoning_model: "mistralai/mistral-small-3.1-24b-instruct:free".into(),
            codegen_model: "deepseek/deepseek-r1-0528:free".into(),
            image_endpoint: "https://api.stability.ai/v2beta/stable-image/generate/sd3".into(),
            image_api_key: None,
            image_output_format: "jpeg".into(),
            op_allowlist: vec![
                OpKind::AddObject,
                OpKind::SetLocation,
                OpKind::SetActive,
                OpKind::SetInput,
                OpKind::SetLabel,
                OpKind::AddNode,
                OpKind::LinkNodes,
                OpKind::AssignMaterial,
            ],
            max_ops: 64,
            texture_dir: ".scene-copilot/textures".into(),
            artifact_root: ".scene-copilot".into(),
            timeout_secs: 0,
            auto_approve: false,
        }
    }
}

impl Config {
    /// Defaults, overlaid with the TOML file when given, then API keys from
    /// the environment for whatever the file left unset.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => {
                let s = fs::read_to_string(p)?;
                toml::from_str(&s).with_context(|| format!("parsing {}", p.display()))?
            }
            None => Config::default(),
        };
        cfg.chat_api_key = non_blank(cfg.chat_api_key.take()).or_else(|| env_key("OPENROUTER_API_KEY"));
        cfg.image_api_key = non_blank(cfg.image_api_key.take()).or_else(|| env_key("STABILITY_API_KEY"));
        Ok(cfg)
    }
}

fn non_blank(key: Option<String>) -> Option<String> {
    key.filter(|k| !k.trim().is_empty())
}

fn env_key(var: &str) -> Option<String> {
    non_blank(std::env::var(var).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_is_not_allowed_by_default() {
        let cfg = Config::default();
        assert!(!cfg.op_allowlist.contains(&OpKind::DeleteObject));
        assert!(cfg.op_allowlist.contains(&OpKind::AddObject));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("copilot.toml");
        fs::write(
            &path,
            "codegen_model = \"openai/gpt-4.1-mini\"\nop_allowlist = [\"add_object\", \"delete_object\"]\nchat_api_key = \"k\"\n",
        )
        .unwrap();
        let cfg = Config::load(Some(&path)).unwrap();
        assert_eq!(cfg.codegen_model, "openai/gpt-4.1-mini");
        assert_eq!(cfg.op_allowlist, vec![OpKind::AddObject, OpKind::DeleteObject]);
        assert_eq!(cfg.chat_api_base, "https://openrouter.ai/api/v1");
        assert_eq!(cfg.chat_api_key.as_deref(), Some("k"));
    }

    #[test]
    fn blank_file_keys_count_as_unset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("copilot.toml");
        fs::write(&path, "chat_api_key = \"\"\nimage_api_key = \"  \"\n").unwrap();
        let cfg = Config::load(Some(&path)).unwrap();
        assert!(cfg.chat_api_key.as_deref().map_or(true, |k| !k.trim().is_empty()));
        assert!(cfg.image_api_key.as_deref().map_or(true, |k| !k.trim().is_empty()));
    }
}
