//! Error types for `axum-mcp-openapi`.

use thiserror::Error;

/// Main error type for the introspection layer.
#[derive(Error, Debug)]
pub enum IntrospectError {
    /// Configuration errors (invalid mount path, bad CORS origin, conflicts).
    #[error("Configuration error: {0}")]
    Config(String),

    /// `OpenAPI` document errors (unresolved or cyclic refs, missing snapshot).
    #[error("OpenAPI error: {0}")]
    Spec(String),

    #[error("OpenAPI error: failed to fetch spec from '{url}': {message}")]
    SpecFetch { url: String, message: String },

    #[error("OpenAPI error: failed to read spec file '{path}': {source}")]
    SpecReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("OpenAPI error: failed to parse OpenAPI spec from '{location}': {source}")]
    SpecParse {
        location: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// The requested path/method pair is not in the route table.
    #[error("Endpoint {method} {path} not found")]
    EndpointNotFound { method: String, path: String },

    /// The requested tool name is not registered.
    #[error("Tool '{0}' not found")]
    UnknownTool(String),

    /// Extraction errors (missing/invalid tool arguments, failed projection).
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for introspection operations.
pub type Result<T> = std::result::Result<T, IntrospectError>;
