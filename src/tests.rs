use super::*;
use crate::config::ConfigError;

#[test]
fn exit_codes_follow_taxonomy() {
    let cases = [
        (RagError::Config(ConfigError::Missing("PATH_TO_INDEX")), 2),
        (RagError::storage("/tmp/faiss.index", "missing"), 3),
        (RagError::InvalidArgument("k".to_string()), 4),
        (
            RagError::DimensionMismatch {
                expected: 384,
                actual: 768,
            },
            5,
        ),
        (RagError::IndexCorruption("position 5".to_string()), 5),
        (RagError::Embedding("down".to_string()), 6),
        (RagError::UpstreamUnavailable("timeout".to_string()), 7),
        (
            RagError::UpstreamError {
                status: 500,
                body: String::new(),
            },
            7,
        ),
        (RagError::UpstreamMalformed("no choices".to_string()), 7),
    ];

    for (error, code) in cases {
        assert_eq!(error.exit_code(), code, "{error}");
        assert_ne!(error.exit_code(), 0);
    }
}

#[test]
fn error_messages_name_the_problem() {
    let error = RagError::storage("/data/docs.json", "No such file or directory");
    assert_eq!(
        error.to_string(),
        "Storage unavailable at /data/docs.json: No such file or directory"
    );

    let error = RagError::from(ConfigError::Missing("FRIENDLI_TOKEN"));
    assert_eq!(
        error.to_string(),
        "Configuration error: Missing required setting: FRIENDLI_TOKEN"
    );

    let error = RagError::DimensionMismatch {
        expected: 384,
        actual: 768,
    };
    assert!(error.to_string().contains("index expects 384"));
}
