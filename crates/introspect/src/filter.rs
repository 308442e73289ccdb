//! The user-route filter predicate.

use std::sync::Arc;

/// Well-known operational paths that are never user routes.
pub const SYSTEM_PATHS: [&str; 8] = [
    "/docs",
    "/redoc",
    "/openapi.json",
    "/favicon.ico",
    "/health",
    "/healthz",
    "/ready",
    "/metrics",
];

/// Filter deciding whether a route path counts as a user endpoint.
///
/// Arguments are the route path and the introspection mount path.
pub type EndpointFilter = Arc<dyn Fn(&str, &str) -> bool + Send + Sync>;

/// Default policy: include everything except the introspection endpoints
/// themselves and the fixed set of system paths.
#[must_use]
pub fn filter_user_endpoints(path: &str, mount_path: &str) -> bool {
    if path.starts_with(mount_path) {
        return false;
    }
    !SYSTEM_PATHS.contains(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excludes_mount_path_and_children() {
        assert!(!filter_user_endpoints("/mcp", "/mcp"));
        assert!(!filter_user_endpoints("/mcp/tools", "/mcp"));
        assert!(!filter_user_endpoints("/mcp/call", "/mcp"));
    }

    #[test]
    fn excludes_system_paths() {
        for path in SYSTEM_PATHS {
            assert!(!filter_user_endpoints(path, "/mcp"), "{path} should be excluded");
        }
    }

    #[test]
    fn includes_user_routes() {
        assert!(filter_user_endpoints("/", "/mcp"));
        assert!(filter_user_endpoints("/users/{user_id}", "/mcp"));
        // Only exact matches count as system paths.
        assert!(filter_user_endpoints("/healthcheck", "/mcp"));
    }
}
