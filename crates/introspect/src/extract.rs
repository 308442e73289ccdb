//! Pure projections from the route table into the wire-shape records.
//!
//! Everything here is best-effort: a route that cannot be projected is
//! skipped (summaries) or degrades to a deterministic fallback (details);
//! extraction never panics on a malformed document.

use crate::models::{EndpointDetail, EndpointInfo, ParameterInfo, ResponseInfo};
use crate::routes::{MatchedOperation, RouteTable, canonical_name, listed_methods, operation_for};
use openapiv3::{
    Operation, Parameter, ParameterSchemaOrContent, PathItem, ReferenceOr, Schema, StatusCode,
};
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Project one path item into a summary record.
///
/// Returns `None` for path items with no listed methods (e.g. OPTIONS-only
/// routes), mirroring how static or method-less routes are invisible to
/// introspection.
#[must_use]
pub fn endpoint_info(path: &str, item: &PathItem) -> Option<EndpointInfo> {
    let methods = listed_methods(item);
    let first_op = methods
        .first()
        .and_then(|m| operation_for(item, m))?;

    let name = first_op
        .operation_id
        .clone()
        .unwrap_or_else(|| canonical_name(&methods[0], path));

    let (summary, _) = summary_and_description(first_op);

    let mut tags: Vec<String> = Vec::new();
    for method in &methods {
        if let Some(op) = operation_for(item, method) {
            for tag in &op.tags {
                if !tags.contains(tag) {
                    tags.push(tag.clone());
                }
            }
        }
    }

    Some(EndpointInfo {
        path: path.to_string(),
        methods,
        name,
        summary,
        tags,
    })
}

/// Project one matched operation into a detail record.
///
/// The record always holds at least one response entry: when the operation
/// declares none, a `"200": Successful Response` entry is synthesized.
#[must_use]
pub fn endpoint_detail(table: &RouteTable, matched: &MatchedOperation) -> EndpointDetail {
    let op = &matched.operation;
    let (summary, description) = summary_and_description(op);

    let parameters = merge_parameters(table, &matched.path_item.parameters, &op.parameters)
        .iter()
        .map(|p| parameter_info(table, p))
        .collect();

    let mut responses = responses_map(table, op);
    if responses.is_empty() {
        responses.insert("200".to_string(), ResponseInfo::default_success());
    }

    EndpointDetail {
        path: matched.path.clone(),
        method: matched.method.clone(),
        summary,
        description,
        parameters,
        request_body: request_body_value(table, op),
        responses,
        tags: op.tags.clone(),
        operation_id: op.operation_id.clone(),
        deprecated: op.deprecated,
    }
}

/// Slice the raw `OpenAPI` fragment for one operation:
/// `{path, method, spec, components}`, or `{}` when absent.
#[must_use]
pub fn openapi_fragment(raw: &Value, path: &str, method: &str) -> Value {
    let operation = raw
        .get("paths")
        .and_then(|paths| paths.get(path))
        .and_then(|item| item.get(method.to_lowercase()));

    match operation {
        Some(spec) => json!({
            "path": path,
            "method": method.to_uppercase(),
            "spec": spec,
            "components": raw.get("components").cloned().unwrap_or_else(|| json!({})),
        }),
        None => json!({}),
    }
}

/// Summary is the explicit operation summary, else the first line of the
/// description; the description keeps whatever the summary did not consume.
fn summary_and_description(op: &Operation) -> (Option<String>, Option<String>) {
    if let Some(summary) = &op.summary {
        return (Some(summary.clone()), op.description.clone());
    }

    let Some(description) = &op.description else {
        return (None, None);
    };

    let mut lines = description.lines();
    let summary = lines.next().map(|l| l.trim().to_string());
    let rest = lines
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();

    let description = if rest.is_empty() { None } else { Some(rest) };
    (summary, description)
}

/// Merge path-item parameters with operation parameters; operation-level
/// declarations override path-item ones with the same (location, name).
/// Unresolvable parameter refs are skipped with a warning.
fn merge_parameters(
    table: &RouteTable,
    path_item_params: &[ReferenceOr<Parameter>],
    operation_params: &[ReferenceOr<Parameter>],
) -> Vec<Parameter> {
    let mut merged: Vec<Parameter> = Vec::new();

    for r in path_item_params.iter().chain(operation_params) {
        let param = match table.resolve(r) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unresolvable parameter");
                continue;
            }
        };

        let key = (location_of(&param), param.parameter_data_ref().name.clone());
        if let Some(existing) = merged
            .iter_mut()
            .find(|p| (location_of(p), p.parameter_data_ref().name.clone()) == key)
        {
            *existing = param;
        } else {
            merged.push(param);
        }
    }

    merged
}

fn location_of(param: &Parameter) -> &'static str {
    match param {
        Parameter::Path { .. } => "path",
        Parameter::Query { .. } => "query",
        Parameter::Header { .. } => "header",
        Parameter::Cookie { .. } => "cookie",
    }
}

fn parameter_info(table: &RouteTable, param: &Parameter) -> ParameterInfo {
    let data = param.parameter_data_ref();
    // Path parameters are always required, whatever the document says.
    let required = matches!(param, Parameter::Path { .. }) || data.required;

    ParameterInfo {
        name: data.name.clone(),
        location: location_of(param).to_string(),
        required,
        schema: parameter_schema(table, &data.format),
        description: data.description.clone(),
    }
}

fn parameter_schema(table: &RouteTable, format: &ParameterSchemaOrContent) -> Value {
    match format {
        ParameterSchemaOrContent::Schema(schema_ref) => schema_ref_to_json(table, schema_ref),
        // Content-typed parameters are rare; fall back to the default vocabulary.
        ParameterSchemaOrContent::Content(_) => json!({"type": "string"}),
    }
}

fn schema_ref_to_json(table: &RouteTable, schema_ref: &ReferenceOr<Schema>) -> Value {
    match schema_ref {
        ReferenceOr::Item(schema) => schema_to_json(schema),
        ReferenceOr::Reference { reference } => match table.resolve(schema_ref) {
            Ok(schema) => schema_to_json(&schema),
            Err(_) => json!({"$ref": reference}),
        },
    }
}

/// Best-effort mapping from an `OpenAPI` schema to the coarse vocabulary
/// (integer/number/string/boolean/array/object). Composite schemas (oneOf,
/// allOf, ...) degrade to `object`.
#[must_use]
pub fn schema_to_json(schema: &Schema) -> Value {
    let mut result = json!({});

    if let Some(desc) = &schema.schema_data.description {
        result["description"] = json!(desc);
    }

    match &schema.schema_kind {
        openapiv3::SchemaKind::Type(t) => match t {
            openapiv3::Type::String(s) => {
                result["type"] = json!("string");
                let enum_values: Vec<_> = s.enumeration.iter().flatten().collect();
                if !enum_values.is_empty() {
                    result["enum"] = json!(enum_values);
                }
            }
            openapiv3::Type::Number(_) => result["type"] = json!("number"),
            openapiv3::Type::Integer(_) => result["type"] = json!("integer"),
            openapiv3::Type::Boolean(_) => result["type"] = json!("boolean"),
            openapiv3::Type::Array(a) => {
                result["type"] = json!("array");
                if let Some(items) = &a.items {
                    result["items"] = match items {
                        ReferenceOr::Item(item) => schema_to_json(item),
                        ReferenceOr::Reference { reference } => json!({"$ref": reference}),
                    };
                }
            }
            openapiv3::Type::Object(o) => {
                result["type"] = json!("object");
                if !o.properties.is_empty() {
                    let mut properties = json!({});
                    for (name, prop) in &o.properties {
                        properties[name] = match prop {
                            ReferenceOr::Item(prop_schema) => schema_to_json(prop_schema),
                            ReferenceOr::Reference { reference } => json!({"$ref": reference}),
                        };
                    }
                    result["properties"] = properties;
                }
                if !o.required.is_empty() {
                    result["required"] = json!(o.required);
                }
            }
        },
        _ => result["type"] = json!("object"),
    }

    result
}

/// Project the JSON request body of an operation, if it declares one.
fn request_body_value(table: &RouteTable, op: &Operation) -> Option<Value> {
    let body_ref = op.request_body.as_ref()?;
    let body = match table.resolve(body_ref) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(error = %e, "skipping unresolvable request body");
            return None;
        }
    };

    let media = body.content.get("application/json").or_else(|| {
        body.content.iter().find_map(|(k, v)| {
            let lower = k.to_ascii_lowercase();
            (lower.contains("json")).then_some(v)
        })
    })?;

    let schema = media
        .schema
        .as_ref()
        .map_or_else(|| json!({}), |s| schema_ref_to_json(table, s));

    let mut value = json!({
        "content": {"application/json": {"schema": schema}},
        "required": body.required,
    });
    if let Some(desc) = &body.description {
        value["description"] = json!(desc);
    }
    Some(value)
}

fn responses_map(table: &RouteTable, op: &Operation) -> BTreeMap<String, ResponseInfo> {
    let mut out = BTreeMap::new();

    for (code, resp_ref) in &op.responses.responses {
        let key = match code {
            StatusCode::Code(n) => n.to_string(),
            StatusCode::Range(n) => format!("{n}XX"),
        };
        if let Some(info) = response_info(table, resp_ref) {
            out.insert(key, info);
        }
    }

    if let Some(default_ref) = &op.responses.default
        && let Some(info) = response_info(table, default_ref)
    {
        out.insert("default".to_string(), info);
    }

    out
}

fn response_info(
    table: &RouteTable,
    resp_ref: &ReferenceOr<openapiv3::Response>,
) -> Option<ResponseInfo> {
    let resp = match table.resolve(resp_ref) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "skipping unresolvable response");
            return None;
        }
    };

    let content = if resp.content.is_empty() {
        None
    } else {
        let mut map = json!({});
        for (media_type, media) in &resp.content {
            let schema = media
                .schema
                .as_ref()
                .map_or_else(|| json!({}), |s| schema_ref_to_json(table, s));
            map[media_type] = json!({"schema": schema});
        }
        Some(map)
    };

    let headers = if resp.headers.is_empty() {
        None
    } else {
        serde_json::to_value(&resp.headers).ok()
    };

    Some(ResponseInfo {
        description: resp.description.clone(),
        content,
        headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use openapiv3::OpenAPI;

    fn table(yaml: &str) -> RouteTable {
        let raw: Value = serde_yaml::from_str(yaml).unwrap();
        let spec: OpenAPI = serde_json::from_value(raw.clone()).unwrap();
        RouteTable::new(spec, raw)
    }

    const SPEC: &str = r#"
openapi: "3.0.0"
info:
  title: t
  version: "1"
components:
  schemas:
    CreateUser:
      type: object
      required: [name]
      properties:
        name: { type: string }
        age: { type: integer }
paths:
  /users/{user_id}:
    get:
      operationId: getUser
      description: |
        Get a user by ID.

        Looks the user up in the demo store.
      tags: [users]
      parameters:
        - name: user_id
          in: path
          required: false
          schema: { type: integer }
        - name: verbose
          in: query
          schema: { type: boolean }
      responses:
        "200":
          description: The user
          content:
            application/json:
              schema: { type: object }
        "404":
          description: Not found
  /users:
    post:
      operationId: createUser
      summary: Create a new user.
      requestBody:
        required: true
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/CreateUser'
      responses: {}
"#;

    fn matched(t: &RouteTable, path: &str, method: &str) -> MatchedOperation {
        t.find_operation(path, method).unwrap()
    }

    #[test]
    fn info_summary_is_first_description_line() {
        let t = table(SPEC);
        let (path, item) = t
            .paths()
            .into_iter()
            .find(|(p, _)| p == "/users/{user_id}")
            .unwrap();
        let info = endpoint_info(&path, &item).unwrap();

        assert_eq!(info.name, "getUser");
        assert_eq!(info.methods, vec!["GET"]);
        assert_eq!(info.summary.as_deref(), Some("Get a user by ID."));
        assert_eq!(info.tags, vec!["users"]);
    }

    #[test]
    fn detail_splits_description_and_marks_path_params_required() {
        let t = table(SPEC);
        let detail = endpoint_detail(&t, &matched(&t, "/users/{user_id}", "GET"));

        assert_eq!(detail.summary.as_deref(), Some("Get a user by ID."));
        assert_eq!(
            detail.description.as_deref(),
            Some("Looks the user up in the demo store.")
        );

        let user_id = detail
            .parameters
            .iter()
            .find(|p| p.name == "user_id")
            .unwrap();
        assert_eq!(user_id.location, "path");
        // Declared required: false, but path params are always required.
        assert!(user_id.required);
        assert_eq!(user_id.schema, json!({"type": "integer"}));

        let verbose = detail
            .parameters
            .iter()
            .find(|p| p.name == "verbose")
            .unwrap();
        assert_eq!(verbose.location, "query");
        assert!(!verbose.required);

        assert!(detail.responses.contains_key("200"));
        assert!(detail.responses.contains_key("404"));
    }

    #[test]
    fn detail_synthesizes_default_response_and_resolves_body_ref() {
        let t = table(SPEC);
        let detail = endpoint_detail(&t, &matched(&t, "/users", "POST"));

        assert_eq!(detail.responses.len(), 1);
        let ok = detail.responses.get("200").unwrap();
        assert_eq!(ok.description, "Successful Response");

        let body = detail.request_body.unwrap();
        assert_eq!(body["required"], json!(true));
        let schema = &body["content"]["application/json"]["schema"];
        assert_eq!(schema["type"], json!("object"));
        assert_eq!(schema["properties"]["age"]["type"], json!("integer"));
        assert_eq!(schema["required"], json!(["name"]));
    }

    #[test]
    fn fragment_slices_operation_and_components() {
        let t = table(SPEC);
        let fragment = openapi_fragment(t.raw(), "/users", "POST");

        assert_eq!(fragment["path"], json!("/users"));
        assert_eq!(fragment["method"], json!("POST"));
        assert_eq!(fragment["spec"]["operationId"], json!("createUser"));
        assert!(fragment["components"]["schemas"]["CreateUser"].is_object());

        assert_eq!(openapi_fragment(t.raw(), "/missing", "GET"), json!({}));
    }

    #[test]
    fn coarse_schema_handles_arrays_enums_and_composites() {
        let t = table(
            r#"
openapi: "3.0.0"
info:
  title: t
  version: "1"
components:
  schemas:
    Tags:
      type: array
      items: { type: string }
    Color:
      type: string
      enum: [red, green]
    Either:
      oneOf:
        - { type: string }
        - { type: integer }
paths: {}
"#,
        );

        let resolve = |name: &str| {
            let r: ReferenceOr<Schema> = ReferenceOr::Reference {
                reference: format!("#/components/schemas/{name}"),
            };
            schema_ref_to_json(&t, &r)
        };

        assert_eq!(
            resolve("Tags"),
            json!({"type": "array", "items": {"type": "string"}})
        );
        assert_eq!(
            resolve("Color"),
            json!({"type": "string", "enum": ["red", "green"]})
        );
        assert_eq!(resolve("Either"), json!({"type": "object"}));
    }
}
