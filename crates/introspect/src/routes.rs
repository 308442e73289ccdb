//! The route table: an in-memory projection of the host's `OpenAPI` document.
//!
//! The table keeps both the typed `openapiv3` model (for structured walking)
//! and the raw JSON value (for `$ref` resolution and fragment slicing). Only
//! local refs (`#/...`) are supported; the host's own generated document never
//! splits across files.

use crate::error::{IntrospectError, Result};
use openapiv3::{OpenAPI, Operation, PathItem, ReferenceOr};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;

/// Methods surfaced by introspection. HEAD and OPTIONS are never listed.
pub const LISTED_METHODS: [&str; 5] = ["GET", "PUT", "POST", "DELETE", "PATCH"];

/// One resolved (path, method) hit in the route table.
#[derive(Debug, Clone)]
pub struct MatchedOperation {
    /// The path template as registered in the document.
    pub path: String,
    /// Uppercase HTTP method.
    pub method: String,
    pub path_item: PathItem,
    pub operation: Operation,
}

/// Immutable snapshot of the host's route surface.
#[derive(Debug, Clone)]
pub struct RouteTable {
    spec: OpenAPI,
    raw: Value,
}

impl RouteTable {
    #[must_use]
    pub fn new(spec: OpenAPI, raw: Value) -> Self {
        Self { spec, raw }
    }

    /// The `info.title` of the underlying document.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.spec.info.title
    }

    /// The raw document, for fragment slicing.
    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// All registered (path, path item) pairs, with path-item `$ref`s
    /// resolved. Unresolvable paths are skipped with a warning.
    #[must_use]
    pub fn paths(&self) -> Vec<(String, PathItem)> {
        let mut out = Vec::with_capacity(self.spec.paths.paths.len());
        for (path, item_ref) in &self.spec.paths.paths {
            match self.resolve(item_ref) {
                Ok(item) => out.push((path.clone(), item)),
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "skipping unresolvable path item");
                }
            }
        }
        out
    }

    /// Find the operation registered for `endpoint_path` and `method`.
    ///
    /// Path comparison is normalized: trailing slashes are ignored and
    /// percent-encoding is decoded. Method comparison is case-insensitive.
    #[must_use]
    pub fn find_operation(&self, endpoint_path: &str, method: &str) -> Option<MatchedOperation> {
        let wanted_path = normalize_path(endpoint_path);
        let wanted_method = method.trim().to_uppercase();
        if !LISTED_METHODS.contains(&wanted_method.as_str()) {
            return None;
        }

        for (path, item) in self.paths() {
            if normalize_path(&path) != wanted_path {
                continue;
            }
            if let Some(op) = operation_for(&item, &wanted_method) {
                return Some(MatchedOperation {
                    path,
                    method: wanted_method,
                    operation: op.clone(),
                    path_item: item,
                });
            }
        }
        None
    }

    /// Resolve a `ReferenceOr<T>` against this document, chasing nested local
    /// refs with a cycle guard.
    ///
    /// # Errors
    ///
    /// Returns an error for external refs, missing pointers, cyclic refs, and
    /// values that do not deserialize as `T`.
    pub fn resolve<T>(&self, r: &ReferenceOr<T>) -> Result<T>
    where
        T: Clone + DeserializeOwned,
    {
        let mut seen: HashSet<String> = HashSet::new();
        let mut cur: ReferenceOr<T> = r.clone();

        loop {
            match cur {
                ReferenceOr::Item(item) => return Ok(item),
                ReferenceOr::Reference { reference } => {
                    if !seen.insert(reference.clone()) {
                        return Err(IntrospectError::Spec(format!(
                            "Cyclic $ref detected while resolving: {reference}",
                        )));
                    }

                    let pointer = local_pointer(&reference)?;
                    let value = self.raw.pointer(&pointer).ok_or_else(|| {
                        IntrospectError::Spec(format!(
                            "Unresolved $ref '{reference}' (missing pointer '{pointer}')",
                        ))
                    })?;

                    cur = serde_json::from_value(value.clone()).map_err(|e| {
                        IntrospectError::Spec(format!(
                            "Failed to deserialize referenced value '{reference}': {e}",
                        ))
                    })?;
                }
            }
        }
    }
}

/// The operation registered on `item` for an uppercase method, if any.
#[must_use]
pub fn operation_for<'a>(item: &'a PathItem, method: &str) -> Option<&'a Operation> {
    match method {
        "GET" => item.get.as_ref(),
        "PUT" => item.put.as_ref(),
        "POST" => item.post.as_ref(),
        "DELETE" => item.delete.as_ref(),
        "PATCH" => item.patch.as_ref(),
        _ => None,
    }
}

/// Methods with a registered operation on `item`, in [`LISTED_METHODS`] order.
#[must_use]
pub fn listed_methods(item: &PathItem) -> Vec<String> {
    LISTED_METHODS
        .iter()
        .filter(|m| operation_for(item, m).is_some())
        .map(|m| (*m).to_string())
        .collect()
}

fn local_pointer(reference: &str) -> Result<String> {
    let Some(frag) = reference.strip_prefix('#') else {
        return Err(IntrospectError::Spec(format!(
            "Unsupported external $ref (only '#/...' is supported): {reference}",
        )));
    };
    if frag.starts_with('/') {
        Ok(frag.to_string())
    } else {
        Err(IntrospectError::Spec(format!(
            "Unsupported $ref fragment (expected JSON pointer starting with '/'): {reference}",
        )))
    }
}

/// Normalize a path for comparison: strip trailing slashes (except the root)
/// and decode percent-encoding.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    let trimmed = if trimmed.is_empty() { "/" } else { trimmed };
    percent_decode(trimmed)
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && let (Some(hi), Some(lo)) = (hex_val(bytes[i + 1]), hex_val(bytes[i + 2]))
        {
            out.push((hi << 4) | lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Generate a canonical route name from method and path, used when an
/// operation has no `operationId` (mirrors `get /users/{id}` -> `get_users_id`).
#[must_use]
pub fn canonical_name(method: &str, path: &str) -> String {
    let mut name = String::with_capacity(method.len() + path.len() + 1);
    name.push_str(&method.to_lowercase());
    name.push('_');

    let mut last_underscore = false;
    for c in path.chars() {
        if c.is_ascii_alphanumeric() {
            name.push(c);
            last_underscore = false;
        } else if !last_underscore {
            name.push('_');
            last_underscore = true;
        }
    }

    let name = name.trim_matches('_').to_string();
    if name.chars().count() > 64 {
        name.chars().take(64).collect()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(yaml: &str) -> RouteTable {
        let raw: Value = serde_yaml::from_str(yaml).unwrap();
        let spec: OpenAPI = serde_json::from_value(raw.clone()).unwrap();
        RouteTable::new(spec, raw)
    }

    const USERS_SPEC: &str = r#"
openapi: "3.0.0"
info:
  title: t
  version: "1"
paths:
  /users/{user_id}:
    get:
      operationId: getUser
      responses:
        "200":
          description: ok
    delete:
      operationId: deleteUser
      responses:
        "204":
          description: gone
"#;

    #[test]
    fn finds_operation_case_insensitively() {
        let t = table(USERS_SPEC);
        let m = t.find_operation("/users/{user_id}", "get").unwrap();
        assert_eq!(m.method, "GET");
        assert_eq!(m.operation.operation_id.as_deref(), Some("getUser"));
    }

    #[test]
    fn find_normalizes_trailing_slash_and_percent_encoding() {
        let t = table(USERS_SPEC);
        assert!(t.find_operation("/users/{user_id}/", "GET").is_some());
        assert!(t.find_operation("/users/%7Buser_id%7D", "GET").is_some());
    }

    #[test]
    fn missing_method_or_path_yields_none() {
        let t = table(USERS_SPEC);
        assert!(t.find_operation("/users/{user_id}", "POST").is_none());
        assert!(t.find_operation("/missing", "GET").is_none());
        assert!(t.find_operation("/users/{user_id}", "HEAD").is_none());
    }

    #[test]
    fn listed_methods_skip_head_and_options() {
        let t = table(USERS_SPEC);
        let (_, item) = t.paths().into_iter().next().unwrap();
        assert_eq!(listed_methods(&item), vec!["GET", "DELETE"]);
    }

    #[test]
    fn resolves_local_parameter_ref() {
        let t = table(
            r#"
openapi: "3.0.0"
info:
  title: t
  version: "1"
components:
  parameters:
    QParam:
      name: q
      in: query
      required: true
      schema:
        type: string
paths: {}
"#,
        );
        let r: ReferenceOr<openapiv3::Parameter> = ReferenceOr::Reference {
            reference: "#/components/parameters/QParam".to_string(),
        };
        let param = t.resolve(&r).unwrap();
        assert_eq!(param.parameter_data_ref().name, "q");
    }

    #[test]
    fn rejects_cyclic_and_external_refs() {
        let t = table(
            r#"
openapi: "3.0.0"
info:
  title: t
  version: "1"
components:
  schemas:
    Loop:
      $ref: '#/components/schemas/Loop'
paths: {}
"#,
        );

        let cyclic: ReferenceOr<openapiv3::Schema> = ReferenceOr::Reference {
            reference: "#/components/schemas/Loop".to_string(),
        };
        assert!(matches!(
            t.resolve(&cyclic),
            Err(IntrospectError::Spec(msg)) if msg.contains("Cyclic")
        ));

        let external: ReferenceOr<openapiv3::Schema> = ReferenceOr::Reference {
            reference: "./common.yaml#/components/schemas/X".to_string(),
        };
        assert!(t.resolve(&external).is_err());
    }

    #[test]
    fn canonical_name_flattens_path_templates() {
        assert_eq!(canonical_name("GET", "/users/{user_id}"), "get_users_user_id");
        assert_eq!(canonical_name("post", "/users"), "post_users");
        assert_eq!(canonical_name("GET", "/"), "get");
    }

    #[test]
    fn canonical_name_truncates_on_char_boundaries() {
        let long = format!("/users/{}", "x".repeat(100));
        assert_eq!(canonical_name("GET", &long).chars().count(), 64);

        // Multibyte methods must not break the cut.
        let method = format!("g{}", "é".repeat(70));
        let name = canonical_name(&method, "/users");
        assert_eq!(name.chars().count(), 64);
        assert!(name.starts_with("gé"));
    }
}
