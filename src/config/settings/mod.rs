#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::default_config_path;

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "RAG_CHAT_CONFIG";

const ENV_INDEX_DIR: &str = "PATH_TO_INDEX";
const ENV_EMBED_MODEL: &str = "EMBED_MODEL";
const ENV_OLLAMA_URL: &str = "OLLAMA_URL";
const ENV_BASE_URL: &str = "FRIENDLI_BASE_URL";
const ENV_TOKEN: &str = "FRIENDLI_TOKEN";
const ENV_ENDPOINT_ID: &str = "FRIENDLI_ENDPOINT_ID";
const ENV_CONTEXT_LABEL: &str = "RAG_CONTEXT_LABEL";

const REDACTED: &str = "<redacted>";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub index: IndexConfig,
    pub embedding: EmbeddingConfig,
    pub generation: GenerationConfig,
    pub prompt: PromptConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IndexConfig {
    /// Directory holding the serialized index and its record file
    pub dir: Option<PathBuf>,
    pub index_file: String,
    pub records_file: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dir: None,
            index_file: "faiss.index".to_string(),
            records_file: "docs.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Root URL of the Ollama server producing query embeddings
    pub url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub retry_attempts: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            model: "all-minilm".to_string(),
            timeout_secs: 30,
            retry_attempts: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub endpoint_id: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.friendli.ai/dedicated".to_string(),
            token: None,
            endpoint_id: None,
            temperature: 0.3,
            max_tokens: 400,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PromptConfig {
    /// Heading placed above the retrieved snippets in the user message
    pub context_label: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            context_label: "Context".to_string(),
        }
    }
}

/// Fully resolved completion endpoint settings
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub base_url: Url,
    pub token: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("Invalid protocol in {0} (must be 'http' or 'https')")]
    InvalidProtocol(String),
    #[error("Invalid model name: {0:?} (cannot be empty)")]
    InvalidModel(String),
    #[error("Invalid file name: {0:?} (cannot be empty)")]
    InvalidFileName(String),
    #[error("Invalid temperature: {0} (must be between 0.0 and 2.0)")]
    InvalidTemperature(f32),
    #[error("Invalid max tokens: {0} (must be between 1 and 32768)")]
    InvalidMaxTokens(u32),
    #[error("Invalid timeout: {0} (must be between 1 and 600 seconds)")]
    InvalidTimeout(u64),
    #[error("Invalid retry attempts: {0} (must be between 1 and 10)")]
    InvalidRetryAttempts(u32),
    #[error("Configuration file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Config {
    /// Load configuration from `.env`, the config file and the process environment
    ///
    /// An explicit `file` must exist. Otherwise `$RAG_CHAT_CONFIG` is consulted, and
    /// finally the platform default path, which is skipped when absent.
    #[inline]
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment overrides from {}", path.display());
        }

        let env_file = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        let path = match (file, env_file) {
            (Some(path), _) => Some(path.to_path_buf()),
            (None, Some(path)) => Some(path),
            (None, None) => default_config_path().filter(|path| path.exists()),
        };

        Self::from_sources(path.as_deref(), |key| std::env::var(key).ok())
    }

    /// Build configuration from an optional TOML file and a key lookup
    #[inline]
    pub fn from_sources<F>(file: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(lookup);
        config.validate()?;
        Ok(config)
    }

    #[inline]
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        debug!("Reading configuration from {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(toml::from_str(&content)?)
    }

    /// Overlay environment-style settings; empty values are ignored
    #[inline]
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(dir) = get(ENV_INDEX_DIR) {
            self.index.dir = Some(PathBuf::from(dir));
        }
        if let Some(model) = get(ENV_EMBED_MODEL) {
            self.embedding.model = model;
        }
        if let Some(url) = get(ENV_OLLAMA_URL) {
            self.embedding.url = url;
        }
        if let Some(url) = get(ENV_BASE_URL) {
            self.generation.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(token) = get(ENV_TOKEN) {
            self.generation.token = Some(token);
        }
        if let Some(endpoint_id) = get(ENV_ENDPOINT_ID) {
            self.generation.endpoint_id = Some(endpoint_id);
        }
        if let Some(label) = get(ENV_CONTEXT_LABEL) {
            self.prompt.context_label = label;
        }
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.index.validate()?;
        self.embedding.validate()?;
        self.generation.validate()?;
        Ok(())
    }

    /// The index directory, which every retrieval requires
    #[inline]
    pub fn index_dir(&self) -> Result<&Path, ConfigError> {
        self.index
            .dir
            .as_deref()
            .ok_or(ConfigError::Missing(ENV_INDEX_DIR))
    }

    /// Path of the serialized vector index
    #[inline]
    pub fn index_path(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.index_dir()?.join(&self.index.index_file))
    }

    /// Path of the record file
    #[inline]
    pub fn records_path(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.index_dir()?.join(&self.index.records_file))
    }

    /// A copy safe to print, with credentials masked
    #[inline]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.generation.token.is_some() {
            config.generation.token = Some(REDACTED.to_string());
        }
        config
    }

    #[inline]
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl IndexConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        for name in [&self.index_file, &self.records_file] {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidFileName(name.clone()));
            }
        }
        Ok(())
    }
}

impl EmbeddingConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_http_url(&self.url)?;

        if self.model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.model.clone()));
        }

        if !(1..=600).contains(&self.timeout_secs) {
            return Err(ConfigError::InvalidTimeout(self.timeout_secs));
        }

        if !(1..=10).contains(&self.retry_attempts) {
            return Err(ConfigError::InvalidRetryAttempts(self.retry_attempts));
        }

        Ok(())
    }

    #[inline]
    pub fn ollama_url(&self) -> Result<Url, ConfigError> {
        parse_http_url(&self.url)
    }
}

impl GenerationConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_http_url(&self.base_url)?;

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidTemperature(self.temperature));
        }

        if !(1..=32_768).contains(&self.max_tokens) {
            return Err(ConfigError::InvalidMaxTokens(self.max_tokens));
        }

        if !(1..=600).contains(&self.timeout_secs) {
            return Err(ConfigError::InvalidTimeout(self.timeout_secs));
        }

        Ok(())
    }

    /// Resolve the endpoint, failing on the first missing credential
    #[inline]
    pub fn endpoint(&self) -> Result<Endpoint, ConfigError> {
        // Blank values from the config file count as missing
        let token = self
            .token
            .clone()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(ENV_TOKEN))?;
        let model = self
            .endpoint_id
            .clone()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(ENV_ENDPOINT_ID))?;

        Ok(Endpoint {
            base_url: parse_http_url(&self.base_url)?,
            token,
            model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout_secs: self.timeout_secs,
        })
    }
}

fn parse_http_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|_| ConfigError::InvalidUrl(raw.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidProtocol(raw.to_string()));
    }
    Ok(url)
}
