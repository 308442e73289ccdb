//! Endpoint introspection tools for axum applications.
//!
//! This crate mounts two JSON-over-HTTP endpoints on a host [`axum::Router`]
//! that let an external agent (e.g. an AI tool) discover what endpoints the
//! host exposes and what each endpoint expects/returns, without reading the
//! host's source:
//!
//! - `GET {mount}/tools` — server info plus descriptors for the two
//!   introspection tools (`list_endpoints`, `get_endpoint_docs`).
//! - `POST {mount}/call` — invoke a tool by name with JSON arguments; the
//!   reply is `{"result": ...}` or `{"error": "..."}`.
//!
//! The route table is a projection of the host's published `OpenAPI` document
//! (inline value, file, or URL). Every introspection call reads an immutable
//! snapshot of that document; there is no other state.

pub mod config;
pub mod error;
pub mod extract;
pub mod filter;
pub mod models;
pub mod registry;
pub mod routes;
pub mod server;
pub mod spec;

pub use config::IntrospectConfig;
pub use error::{IntrospectError, Result};
pub use filter::EndpointFilter;
pub use models::{EndpointDetail, EndpointDocs, EndpointInfo};
pub use server::{IntrospectionServer, mount};
pub use spec::SpecSource;
