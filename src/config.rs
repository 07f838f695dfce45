use crate::error::{BridgeError, Result};
use crate::message::INNER_THOUGHTS_KEY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Longest tool call id OpenAI-compatible servers accept.
pub const TOOL_CALL_ID_MAX_LEN: usize = 29;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub openai: OpenAiOptions,
    #[serde(default)]
    pub anthropic: AnthropicOptions,
    #[serde(default)]
    pub google: GoogleOptions,
    #[serde(default)]
    pub cohere: CohereOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Accept the deprecated `function` role and `function_call` field.
    #[serde(default)]
    pub allow_functions_style: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiOptions {
    /// Tool call ids are cut to this many characters on output. 0 disables.
    #[serde(default = "default_max_tool_id_length")]
    pub max_tool_id_length: usize,
    #[serde(default = "default_true")]
    pub put_inner_thoughts_in_kwargs: bool,
    #[serde(default = "default_inner_thoughts_key")]
    pub inner_thoughts_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnthropicOptions {
    /// Tag wrapped around assistant text. Empty means no wrapping.
    #[serde(default = "default_inner_thoughts_tag")]
    pub inner_thoughts_tag: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleOptions {
    #[serde(default = "default_true")]
    pub put_inner_thoughts_in_kwargs: bool,
    #[serde(default = "default_inner_thoughts_key")]
    pub inner_thoughts_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohereOptions {
    #[serde(default = "default_cohere_role")]
    pub function_call_role: String,
    #[serde(default = "default_function_call_prefix")]
    pub function_call_prefix: String,
    #[serde(default = "default_cohere_role")]
    pub function_response_role: String,
    #[serde(default = "default_function_response_prefix")]
    pub function_response_prefix: String,
}

fn default_true() -> bool {
    true
}

fn default_max_tool_id_length() -> usize {
    TOOL_CALL_ID_MAX_LEN
}

fn default_inner_thoughts_key() -> String {
    INNER_THOUGHTS_KEY.to_string()
}

fn default_inner_thoughts_tag() -> String {
    "thinking".to_string()
}

fn default_cohere_role() -> String {
    "SYSTEM".to_string()
}

fn default_function_call_prefix() -> String {
    "[CHATBOT called function]".to_string()
}

fn default_function_response_prefix() -> String {
    "[CHATBOT function returned]".to_string()
}

impl Default for OpenAiOptions {
    fn default() -> Self {
        Self {
            max_tool_id_length: default_max_tool_id_length(),
            put_inner_thoughts_in_kwargs: true,
            inner_thoughts_key: default_inner_thoughts_key(),
        }
    }
}

impl OpenAiOptions {
    /// Options that leave reasoning text in `content` and ids untouched.
    #[must_use]
    pub fn passthrough() -> Self {
        Self {
            max_tool_id_length: 0,
            put_inner_thoughts_in_kwargs: false,
            inner_thoughts_key: default_inner_thoughts_key(),
        }
    }
}

impl Default for AnthropicOptions {
    fn default() -> Self {
        Self {
            inner_thoughts_tag: default_inner_thoughts_tag(),
        }
    }
}

impl Default for GoogleOptions {
    fn default() -> Self {
        Self {
            put_inner_thoughts_in_kwargs: true,
            inner_thoughts_key: default_inner_thoughts_key(),
        }
    }
}

impl Default for CohereOptions {
    fn default() -> Self {
        Self {
            function_call_role: default_cohere_role(),
            function_call_prefix: default_function_call_prefix(),
            function_response_role: default_cohere_role(),
            function_response_prefix: default_function_response_prefix(),
        }
    }
}

impl BridgeConfig {
    /// Load config from a TOML file. Missing sections and keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Search standard locations for a config file, falling back to defaults.
    /// Priority: explicit path > CWD > XDG config > home dir
    pub fn find_and_load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::load(path);
        }

        for candidate in config_search_paths() {
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "Loading config");
                return Self::load(&candidate);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| BridgeError::config(format!("Failed to render config: {e}")))
    }
}

pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("message-bridge.toml")];

    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        paths.push(PathBuf::from(xdg).join("message-bridge").join("config.toml"));
    }

    if let Some(home) = home_dir() {
        paths.push(home.join(".config").join("message-bridge").join("config.toml"));
        paths.push(home.join(".message-bridge.toml"));
    }

    paths
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(
            f,
            r#"
[ingest]
allow_functions_style = true

[openai]
max_tool_id_length = 8
put_inner_thoughts_in_kwargs = false

[anthropic]
inner_thoughts_tag = "reasoning"

[cohere]
function_call_role = "TOOL"
"#
        )
        .unwrap();

        let config = BridgeConfig::load(f.path()).unwrap();
        assert!(config.ingest.allow_functions_style);
        assert_eq!(config.openai.max_tool_id_length, 8);
        assert!(!config.openai.put_inner_thoughts_in_kwargs);
        assert_eq!(config.openai.inner_thoughts_key, "inner_thoughts");
        assert_eq!(config.anthropic.inner_thoughts_tag, "reasoning");
        assert!(config.google.put_inner_thoughts_in_kwargs);
        assert_eq!(config.cohere.function_call_role, "TOOL");
        assert_eq!(config.cohere.function_response_role, "SYSTEM");
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let f = NamedTempFile::new().unwrap();
        let config = BridgeConfig::load(f.path()).unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.openai.max_tool_id_length, TOOL_CALL_ID_MAX_LEN);
        assert_eq!(config.cohere.function_call_prefix, "[CHATBOT called function]");
    }

    #[test]
    fn test_missing_explicit_path_is_config_error() {
        let err = BridgeConfig::find_and_load(Some(Path::new("/nonexistent/bridge.toml")))
            .unwrap_err();
        assert!(matches!(err, BridgeError::Config { .. }));
    }

    #[test]
    fn test_to_toml_round_trips() {
        let config = BridgeConfig::default();
        let rendered = config.to_toml().unwrap();
        let parsed: BridgeConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
