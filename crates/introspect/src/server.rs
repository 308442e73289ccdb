//! The introspection surface: tool dispatch plus the mounted axum routes.

use crate::config::{CorsConfig, IntrospectConfig};
use crate::error::{IntrospectError, Result};
use crate::extract;
use crate::filter::{self, EndpointFilter};
use crate::models::{EndpointDocs, EndpointInfo};
use crate::registry::{GET_ENDPOINT_DOCS, LIST_ENDPOINTS, ToolRegistry};
use crate::routes::RouteTable;
use crate::spec::SpecSource;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::{Json, Router, extract::State};
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// One mounted introspection surface over one `OpenAPI` document.
///
/// Tool calls read an immutable snapshot of the document; [`reload`] swaps
/// the snapshot atomically, so in-flight calls keep a consistent view.
///
/// [`reload`]: IntrospectionServer::reload
pub struct IntrospectionServer {
    config: IntrospectConfig,
    source: SpecSource,
    filter: EndpointFilter,
    registry: ToolRegistry,
    client: reqwest::Client,
    table: RwLock<Option<Arc<RouteTable>>>,
}

impl IntrospectionServer {
    /// # Errors
    ///
    /// Returns [`IntrospectError::Config`] when the configuration fails
    /// validation.
    pub fn new(config: IntrospectConfig, source: SpecSource) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            source,
            filter: Arc::new(filter::filter_user_endpoints),
            registry: ToolRegistry::new(),
            client: reqwest::Client::new(),
            table: RwLock::new(None),
        })
    }

    /// Replace the built-in endpoint filter. The filter receives
    /// `(path, mount_path)` and keeps the path when it returns `true`.
    #[must_use]
    pub fn with_filter(mut self, filter: EndpointFilter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn config(&self) -> &IntrospectConfig {
        &self.config
    }

    /// Load the document for the first time.
    ///
    /// # Errors
    ///
    /// Fails when the source cannot be read or does not parse as `OpenAPI`.
    pub async fn start(&self) -> Result<()> {
        self.reload().await
    }

    /// Re-read the source and swap the route-table snapshot.
    ///
    /// # Errors
    ///
    /// Fails when the source cannot be read or does not parse as `OpenAPI`;
    /// the previous snapshot stays in place on failure.
    pub async fn reload(&self) -> Result<()> {
        let table = self.source.load(&self.client).await?;
        tracing::info!(
            source = %self.source.location(),
            title = %table.title(),
            paths = table.paths().len(),
            "loaded OpenAPI document"
        );
        *self.table.write() = Some(Arc::new(table));
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`IntrospectError::Spec`] before [`start`] has loaded a
    /// document.
    ///
    /// [`start`]: IntrospectionServer::start
    pub fn snapshot(&self) -> Result<Arc<RouteTable>> {
        self.table.read().clone().ok_or_else(|| {
            IntrospectError::Spec("no document loaded; call start() before serving".to_string())
        })
    }

    /// List user endpoints in document order, with system paths, the mount
    /// path and configured excludes hidden.
    ///
    /// # Errors
    ///
    /// Returns [`IntrospectError::Spec`] when no document is loaded.
    pub fn list_endpoints(&self) -> Result<Vec<EndpointInfo>> {
        let table = self.snapshot()?;
        let mut out = Vec::new();
        for (path, item) in table.paths() {
            if !self.is_visible(&path) {
                continue;
            }
            if let Some(info) = extract::endpoint_info(&path, &item) {
                out.push(info);
            }
        }
        Ok(out)
    }

    /// Full documentation for one endpoint.
    ///
    /// The filter and excludes govern listing only; any method/path pair in
    /// the route table is documentable, hidden from the listing or not.
    ///
    /// # Errors
    ///
    /// Returns [`IntrospectError::EndpointNotFound`] when the method/path
    /// pair is not in the route table, and [`IntrospectError::Spec`] when
    /// no document is loaded.
    pub fn get_endpoint_docs(&self, endpoint_path: &str, method: &str) -> Result<EndpointDocs> {
        let table = self.snapshot()?;
        let matched = table.find_operation(endpoint_path, method).ok_or_else(|| {
            IntrospectError::EndpointNotFound {
                method: method.trim().to_uppercase(),
                path: endpoint_path.to_string(),
            }
        })?;

        let endpoint = extract::endpoint_detail(&table, &matched);
        let openapi_spec = extract::openapi_fragment(table.raw(), &matched.path, &matched.method);
        Ok(EndpointDocs {
            endpoint,
            openapi_spec,
        })
    }

    /// Dispatch one tool call by name.
    ///
    /// # Errors
    ///
    /// Returns [`IntrospectError::UnknownTool`] for unknown names,
    /// [`IntrospectError::Extraction`] for missing arguments, and whatever
    /// the tool itself fails with.
    pub fn call_tool(&self, name: &str, arguments: &Value) -> Result<Value> {
        match name {
            LIST_ENDPOINTS => Ok(serde_json::to_value(self.list_endpoints()?)?),
            GET_ENDPOINT_DOCS => {
                let endpoint_path = arguments
                    .get("endpoint_path")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        IntrospectError::Extraction(
                            "get_endpoint_docs requires an 'endpoint_path' argument".to_string(),
                        )
                    })?;
                let method = arguments
                    .get("method")
                    .and_then(Value::as_str)
                    .unwrap_or("GET");
                Ok(serde_json::to_value(
                    self.get_endpoint_docs(endpoint_path, method)?,
                )?)
            }
            other => Err(IntrospectError::UnknownTool(other.to_string())),
        }
    }

    /// Build the two-route router, to be nested under the mount path.
    ///
    /// # Errors
    ///
    /// Returns [`IntrospectError::Config`] when a configured CORS origin is
    /// not a valid header value.
    pub fn router(self: &Arc<Self>) -> Result<Router> {
        let tools = json!({
            "server": {
                "name": self.config.server_name,
                "version": self.config.server_version,
            },
            "tools": serde_json::to_value(self.registry.descriptors())?,
        });
        let state = AppState {
            server: Arc::clone(self),
            tools,
        };

        let mut router = Router::new()
            .route("/tools", get(tools_handler))
            .route("/call", post(call_handler))
            .with_state(state);

        if self.config.cors.enabled {
            router = router.layer(cors_layer(&self.config.cors)?);
        }
        Ok(router)
    }

    fn is_visible(&self, path: &str) -> bool {
        (self.filter)(path, &self.config.mount_path)
            && !self.config.exclude_paths.iter().any(|p| p == path)
            && !self
                .config
                .exclude_prefixes
                .iter()
                .any(|p| path.starts_with(p.as_str()))
    }
}

/// Nest the introspection routes under the server's mount path.
///
/// # Errors
///
/// Returns [`IntrospectError::Config`] when the CORS configuration is
/// invalid.
pub fn mount(app: Router, server: &Arc<IntrospectionServer>) -> Result<Router> {
    let mounted = app.nest(&server.config.mount_path, server.router()?);
    tracing::info!(mount_path = %server.config.mount_path, "mounted introspection endpoints");
    Ok(mounted)
}

#[derive(Clone)]
struct AppState {
    server: Arc<IntrospectionServer>,
    tools: Value,
}

#[derive(Debug, Deserialize)]
struct CallRequest {
    #[serde(default)]
    tool: String,
    #[serde(default)]
    arguments: Value,
}

async fn tools_handler(State(state): State<AppState>) -> Json<Value> {
    Json(state.tools.clone())
}

/// Always answers 200; failures travel in the `error` field as a message
/// string so callers only ever parse one envelope shape.
async fn call_handler(State(state): State<AppState>, Json(req): Json<CallRequest>) -> Json<Value> {
    if req.tool.is_empty() {
        return Json(json!({"error": "request must include a 'tool' name"}));
    }
    match state.server.call_tool(&req.tool, &req.arguments) {
        Ok(result) => Json(json!({"result": result})),
        Err(e) => {
            tracing::warn!(tool = %req.tool, error = %e, "tool call failed");
            Json(json!({"error": e.to_string()}))
        }
    }
}

fn cors_layer(cfg: &CorsConfig) -> Result<CorsLayer> {
    if cfg.origins.is_empty() {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    let mut origins = Vec::with_capacity(cfg.origins.len());
    for origin in &cfg.origins {
        let value = origin.parse::<HeaderValue>().map_err(|_| {
            IntrospectError::Config(format!("invalid CORS origin '{origin}'"))
        })?;
        origins.push(value);
    }
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}
