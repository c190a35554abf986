use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn default_config() {
    let config = Config::default();
    assert_eq!(config.index.dir, None);
    assert_eq!(config.index.index_file, "faiss.index");
    assert_eq!(config.index.records_file, "docs.json");
    assert_eq!(config.embedding.url, "http://localhost:11434");
    assert_eq!(config.embedding.model, "all-minilm");
    assert_eq!(config.generation.base_url, "https://api.friendli.ai/dedicated");
    assert!((config.generation.temperature - 0.3).abs() < f32::EPSILON);
    assert_eq!(config.generation.max_tokens, 400);
    assert_eq!(config.generation.timeout_secs, 120);
    assert_eq!(config.prompt.context_label, "Context");
    assert!(config.validate().is_ok());
}

#[test]
fn config_validation() {
    let config = Config::default();

    let mut invalid_config = config.clone();
    invalid_config.embedding.url = "ftp://localhost:11434".to_string();
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidProtocol(_))
    ));

    let mut invalid_config = config.clone();
    invalid_config.embedding.url = "not a url".to_string();
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidUrl(_))
    ));

    let mut invalid_config = config.clone();
    invalid_config.embedding.model = "  ".to_string();
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidModel(_))
    ));

    let mut invalid_config = config.clone();
    invalid_config.generation.temperature = 2.5;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidTemperature(_))
    ));

    let mut invalid_config = config.clone();
    invalid_config.generation.max_tokens = 0;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidMaxTokens(0))
    ));

    let mut invalid_config = config.clone();
    invalid_config.generation.timeout_secs = 0;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidTimeout(0))
    ));

    let mut invalid_config = config.clone();
    invalid_config.embedding.retry_attempts = 0;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidRetryAttempts(0))
    ));

    let mut invalid_config = config;
    invalid_config.index.records_file = String::new();
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidFileName(_))
    ));
}

#[test]
fn environment_overrides_defaults() {
    let config = Config::from_sources(
        None,
        lookup_from(&[
            ("PATH_TO_INDEX", "/data/index"),
            ("EMBED_MODEL", "nomic-embed-text"),
            ("OLLAMA_URL", "http://embedder:11434"),
            ("FRIENDLI_BASE_URL", "https://example.com/api/"),
            ("FRIENDLI_TOKEN", "secret"),
            ("FRIENDLI_ENDPOINT_ID", "endpoint-1"),
            ("RAG_CONTEXT_LABEL", "Context (sleep rows)"),
        ]),
    )
    .expect("should build config from environment");

    assert_eq!(config.index.dir, Some(PathBuf::from("/data/index")));
    assert_eq!(config.embedding.model, "nomic-embed-text");
    assert_eq!(config.embedding.url, "http://embedder:11434");
    assert_eq!(config.generation.base_url, "https://example.com/api");
    assert_eq!(config.generation.token.as_deref(), Some("secret"));
    assert_eq!(config.generation.endpoint_id.as_deref(), Some("endpoint-1"));
    assert_eq!(config.prompt.context_label, "Context (sleep rows)");
}

#[test]
fn empty_environment_values_are_ignored() {
    let config = Config::from_sources(None, lookup_from(&[("EMBED_MODEL", "   ")]))
        .expect("should build config");
    assert_eq!(config.embedding.model, "all-minilm");
}

#[test]
fn missing_index_dir_is_reported() {
    let config = Config::default();
    assert!(matches!(
        config.index_dir(),
        Err(ConfigError::Missing("PATH_TO_INDEX"))
    ));
    assert!(config.index_path().is_err());
    assert!(config.records_path().is_err());
}

#[test]
fn index_paths_join_directory() {
    let config = Config::from_sources(None, lookup_from(&[("PATH_TO_INDEX", "/data/index")]))
        .expect("should build config");

    assert_eq!(
        config.index_path().expect("index path"),
        PathBuf::from("/data/index/faiss.index")
    );
    assert_eq!(
        config.records_path().expect("records path"),
        PathBuf::from("/data/index/docs.json")
    );
}

#[test]
fn endpoint_requires_token_then_model() {
    let mut generation = GenerationConfig::default();
    assert!(matches!(
        generation.endpoint(),
        Err(ConfigError::Missing("FRIENDLI_TOKEN"))
    ));

    generation.token = Some("secret".to_string());
    assert!(matches!(
        generation.endpoint(),
        Err(ConfigError::Missing("FRIENDLI_ENDPOINT_ID"))
    ));

    generation.endpoint_id = Some("endpoint-1".to_string());
    let endpoint = generation.endpoint().expect("endpoint should resolve");
    assert_eq!(endpoint.token, "secret");
    assert_eq!(endpoint.model, "endpoint-1");
    assert_eq!(endpoint.max_tokens, 400);
    assert_eq!(endpoint.base_url.host_str(), Some("api.friendli.ai"));
}

#[test]
fn blank_credentials_count_as_missing() {
    let config: Config = toml::from_str(
        r#"
        [generation]
        token = ""
        endpoint_id = "endpoint-1"
        "#,
    )
    .expect("should parse toml");
    assert!(matches!(
        config.generation.endpoint(),
        Err(ConfigError::Missing("FRIENDLI_TOKEN"))
    ));

    let mut generation = config.generation;
    generation.token = Some("secret".to_string());
    generation.endpoint_id = Some("  ".to_string());
    assert!(matches!(
        generation.endpoint(),
        Err(ConfigError::Missing("FRIENDLI_ENDPOINT_ID"))
    ));
}

#[test]
fn ollama_url_generation() {
    let url = EmbeddingConfig::default()
        .ollama_url()
        .expect("should generate ollama_url successfully");
    assert_eq!(url.as_str(), "http://localhost:11434/");
}

#[test]
fn redacted_masks_token() {
    let mut config = Config::default();
    config.generation.token = Some("secret".to_string());

    let redacted = config.redacted();
    assert_eq!(redacted.generation.token.as_deref(), Some("<redacted>"));
    assert_eq!(config.generation.token.as_deref(), Some("secret"));

    let rendered = redacted.to_toml().expect("should serialize");
    assert!(!rendered.contains("secret"));
}

#[test]
fn toml_serialization() {
    let config = Config::default();
    let toml_str = toml::to_string(&config).expect("should serialize toml correctly");
    let parsed_config: Config = toml::from_str(&toml_str).expect("should parse toml correctly");
    assert_eq!(config, parsed_config);
}
