//! Loading the host's `OpenAPI` document.
//!
//! The host hands us its already-generated schema; we never generate one. The
//! document can be provided inline (the common case for in-process mounting),
//! or loaded from a file or URL when the introspection layer runs next to the
//! host instead of inside it.

use crate::error::{IntrospectError, Result};
use crate::routes::RouteTable;
use openapiv3::OpenAPI;
use serde_json::Value;
use std::path::PathBuf;
use url::Url;

/// Where the host's `OpenAPI` document comes from.
#[derive(Debug, Clone)]
pub enum SpecSource {
    /// An already-materialized document value.
    Inline(Value),
    /// A JSON or YAML file on disk.
    File(PathBuf),
    /// An http(s) URL serving the document.
    Url(String),
}

impl SpecSource {
    /// Describe the source for logs and error context.
    #[must_use]
    pub fn location(&self) -> String {
        match self {
            SpecSource::Inline(_) => "<inline>".to_string(),
            SpecSource::File(path) => path.display().to_string(),
            SpecSource::Url(url) => url.clone(),
        }
    }

    /// Load and parse the document into a route table.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read, fetched, or parsed as
    /// `OpenAPI` (JSON is a valid subset of YAML, so `serde_yaml` handles both).
    pub async fn load(&self, client: &reqwest::Client) -> Result<RouteTable> {
        let raw: Value = match self {
            SpecSource::Inline(value) => value.clone(),
            SpecSource::File(path) => {
                tracing::info!("Loading OpenAPI spec from {}", path.display());
                let content = std::fs::read_to_string(path).map_err(|e| {
                    IntrospectError::SpecReadFile {
                        path: path.display().to_string(),
                        source: e,
                    }
                })?;
                parse_document(&content, &self.location())?
            }
            SpecSource::Url(url) => {
                tracing::info!("Fetching OpenAPI spec from {url}");
                let parsed = Url::parse(url).map_err(|e| {
                    IntrospectError::Spec(format!("Invalid OpenAPI spec URL '{url}': {e}"))
                })?;
                let content = client
                    .get(parsed)
                    .send()
                    .await
                    .map_err(|e| IntrospectError::SpecFetch {
                        url: url.clone(),
                        message: e.to_string(),
                    })?
                    .text()
                    .await
                    .map_err(|e| IntrospectError::SpecFetch {
                        url: url.clone(),
                        message: e.to_string(),
                    })?;
                parse_document(&content, &self.location())?
            }
        };

        let spec: OpenAPI =
            serde_json::from_value(raw.clone()).map_err(|e| IntrospectError::Spec(format!(
                "Invalid OpenAPI document from '{}': {e}",
                self.location()
            )))?;

        Ok(RouteTable::new(spec, raw))
    }
}

fn parse_document(content: &str, location: &str) -> Result<Value> {
    serde_yaml::from_str(content).map_err(|e| IntrospectError::SpecParse {
        location: location.to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[tokio::test]
    async fn loads_inline_spec() {
        let source = SpecSource::Inline(serde_json::json!({
            "openapi": "3.0.0",
            "info": {"title": "t", "version": "1"},
            "paths": {}
        }));
        let table = source.load(&reqwest::Client::new()).await.unwrap();
        assert_eq!(table.title(), "t");
    }

    #[tokio::test]
    async fn loads_yaml_spec_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
openapi: "3.0.0"
info:
  title: file-api
  version: "1"
paths:
  /ping:
    get:
      operationId: ping
      responses:
        "200":
          description: ok
"#
        )
        .unwrap();

        let source = SpecSource::File(file.path().to_path_buf());
        let table = source.load(&reqwest::Client::new()).await.unwrap();
        assert_eq!(table.title(), "file-api");
        assert!(table.find_operation("/ping", "GET").is_some());
    }

    #[tokio::test]
    async fn rejects_non_openapi_document() {
        let source = SpecSource::Inline(serde_json::json!({"not": "a spec"}));
        let err = source.load(&reqwest::Client::new()).await.unwrap_err();
        assert!(matches!(err, IntrospectError::Spec(_)));
    }
}
