//! Wire-shape records produced by the introspection tools.
//!
//! These are passive projections over the host's `OpenAPI` document; they are
//! recomputed on every call and hold no state of their own.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Basic information about one endpoint, as returned by `list_endpoints`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndpointInfo {
    /// The endpoint path template (e.g. `/users/{user_id}`).
    pub path: String,
    /// HTTP methods supported by this endpoint (HEAD/OPTIONS never listed).
    pub methods: Vec<String>,
    /// Operation id, or a canonical name generated from method and path.
    pub name: String,
    /// Brief description of the endpoint.
    pub summary: Option<String>,
    /// Tags associated with the endpoint.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Information about one endpoint parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParameterInfo {
    pub name: String,
    /// Parameter location: `path`, `query`, `header`, or `cookie`.
    #[serde(rename = "in")]
    pub location: String,
    pub required: bool,
    /// Coarse JSON schema for the parameter (`{"type": "string"}` fallback).
    pub schema: Value,
    pub description: Option<String>,
}

/// Information about one declared response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseInfo {
    pub description: String,
    /// Response content keyed by media type.
    pub content: Option<Value>,
    pub headers: Option<Value>,
}

impl ResponseInfo {
    /// The synthesized entry used when a route declares no responses at all.
    #[must_use]
    pub fn default_success() -> Self {
        ResponseInfo {
            description: "Successful Response".to_string(),
            content: Some(serde_json::json!({"application/json": {"schema": {}}})),
            headers: None,
        }
    }
}

/// Detailed information about one endpoint, as returned by `get_endpoint_docs`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndpointDetail {
    pub path: String,
    /// HTTP method (uppercase).
    pub method: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterInfo>,
    pub request_body: Option<Value>,
    /// Responses keyed by status code string (`"200"`, `"2XX"`, `"default"`).
    ///
    /// Always holds at least one entry; see [`ResponseInfo::default_success`].
    pub responses: BTreeMap<String, ResponseInfo>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub operation_id: Option<String>,
    #[serde(default)]
    pub deprecated: bool,
}

/// Full reply of the `get_endpoint_docs` tool: the simplified detail record
/// plus the raw `OpenAPI` fragment for the same operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointDocs {
    pub endpoint: EndpointDetail,
    /// `{path, method, spec, components}`, or `{}` when the operation is
    /// absent from the raw document.
    pub openapi_spec: Value,
}
