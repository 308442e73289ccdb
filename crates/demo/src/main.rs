//! Demo user service with the introspection surface mounted.
//!
//! Run it, then ask the mounted tools what it can do:
//!
//! ```text
//! curl localhost:8080/mcp/tools
//! curl -X POST localhost:8080/mcp/call -H 'content-type: application/json' \
//!   -d '{"tool": "list_endpoints"}'
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use axum_mcp_openapi::{IntrospectConfig, IntrospectionServer, SpecSource, mount};
use clap::Parser;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

const OPENAPI_YAML: &str = include_str!("../openapi.yaml");

#[derive(Debug, Parser)]
#[command(name = "axum-mcp-openapi-demo", version, about)]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "DEMO_BIND", default_value = "127.0.0.1:8080")]
    bind: String,
    /// Path prefix for the introspection routes.
    #[arg(long, env = "DEMO_MOUNT_PATH", default_value = "/mcp")]
    mount_path: String,
}

#[derive(Debug, Clone, Serialize)]
struct User {
    id: u64,
    name: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    name: String,
    email: String,
}

#[derive(Clone, Default)]
struct Store {
    users: Arc<RwLock<Vec<User>>>,
}

impl Store {
    fn seeded() -> Self {
        let store = Self::default();
        store.users.write().extend([
            User {
                id: 1,
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            },
            User {
                id: 2,
                name: "Grace".to_string(),
                email: "grace@example.com".to_string(),
            },
        ]);
        store
    }

    fn next_id(&self) -> u64 {
        self.users.read().iter().map(|u| u.id).max().unwrap_or(0) + 1
    }
}

fn not_found(user_id: u64) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"detail": format!("no user with id {user_id}")})),
    )
        .into_response()
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "demo-user-service",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn openapi_json(State(spec): State<Arc<Value>>) -> Json<Value> {
    Json((*spec).clone())
}

async fn list_users(State(store): State<Store>) -> Json<Vec<User>> {
    Json(store.users.read().clone())
}

async fn create_user(State(store): State<Store>, Json(payload): Json<UserPayload>) -> Response {
    let user = User {
        id: store.next_id(),
        name: payload.name,
        email: payload.email,
    };
    store.users.write().push(user.clone());
    (StatusCode::CREATED, Json(user)).into_response()
}

async fn get_user(State(store): State<Store>, Path(user_id): Path<u64>) -> Response {
    match store.users.read().iter().find(|u| u.id == user_id) {
        Some(user) => Json(user.clone()).into_response(),
        None => not_found(user_id),
    }
}

async fn update_user(
    State(store): State<Store>,
    Path(user_id): Path<u64>,
    Json(payload): Json<UserPayload>,
) -> Response {
    let mut users = store.users.write();
    match users.iter_mut().find(|u| u.id == user_id) {
        Some(user) => {
            user.name = payload.name;
            user.email = payload.email;
            Json(user.clone()).into_response()
        }
        None => not_found(user_id),
    }
}

async fn delete_user(State(store): State<Store>, Path(user_id): Path<u64>) -> Response {
    let mut users = store.users.write();
    let before = users.len();
    users.retain(|u| u.id != user_id);
    if users.len() == before {
        not_found(user_id)
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

fn app(spec: Arc<Value>) -> Router {
    let store = Store::seeded();
    Router::new()
        .route("/", get(root))
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{user_id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .with_state(store)
        .route("/health", get(health))
        .route("/openapi.json", get(openapi_json).with_state(spec))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let spec: Value = serde_yaml::from_str(OPENAPI_YAML)?;
    let spec = Arc::new(spec);

    let config = IntrospectConfig {
        mount_path: args.mount_path,
        server_name: "demo-user-service".to_string(),
        server_version: env!("CARGO_PKG_VERSION").to_string(),
        ..IntrospectConfig::default()
    };
    let server = Arc::new(IntrospectionServer::new(
        config,
        SpecSource::Inline((*spec).clone()),
    )?);
    server.start().await?;

    let app = mount(app(spec), &server)?;

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "demo user service listening");
    axum::serve(listener, app).await?;
    Ok(())
}
