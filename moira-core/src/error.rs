//! Error types for moira-core.

use thiserror::Error;

/// All errors that can arise while reading or writing a local document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// YAML serialization error (dump path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document body is not valid YAML for its declared type.
    #[error("failed to parse {kind} document: {source}")]
    Parse {
        kind: &'static str,
        #[source]
        source: serde_yaml::Error,
    },

    /// The `type` field names something this tool does not manage.
    ///
    /// Reported as a warning by callers, never as a hard failure.
    #[error("unsupported document type '{0}'")]
    UnsupportedType(String),
}
