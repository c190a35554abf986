// Configuration management module
// Layers built-in defaults, an optional TOML file and the process environment

pub mod settings;


pub use settings::{
    CONFIG_ENV_VAR, Config, ConfigError, EmbeddingConfig, Endpoint, GenerationConfig, IndexConfig,
    PromptConfig,
};

/// Get the default configuration file path, if the platform has a config directory
#[inline]
pub fn default_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|dir| dir.join("rag-chat").join("config.toml"))
}
