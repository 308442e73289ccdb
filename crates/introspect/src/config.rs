//! Mount-time configuration.

use crate::error::{IntrospectError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for one mounted introspection surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectConfig {
    /// Path prefix the introspection routes are nested under.
    #[serde(default = "default_mount_path")]
    pub mount_path: String,
    /// Name reported in the `server` block of the tools listing.
    #[serde(default = "default_server_name")]
    pub server_name: String,
    /// Version reported in the `server` block of the tools listing.
    #[serde(default = "default_server_version")]
    pub server_version: String,
    /// Extra exact paths to hide from listings, on top of the built-in
    /// system paths.
    #[serde(default)]
    pub exclude_paths: Vec<String>,
    /// Extra path prefixes to hide from listings.
    #[serde(default)]
    pub exclude_prefixes: Vec<String>,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Allowed origins. Empty means any origin.
    #[serde(default)]
    pub origins: Vec<String>,
}

fn default_mount_path() -> String {
    "/mcp".to_string()
}

fn default_server_name() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

fn default_server_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_true() -> bool {
    true
}

impl Default for IntrospectConfig {
    fn default() -> Self {
        Self {
            mount_path: default_mount_path(),
            server_name: default_server_name(),
            server_version: default_server_version(),
            exclude_paths: Vec::new(),
            exclude_prefixes: Vec::new(),
            cors: CorsConfig::default(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            origins: Vec::new(),
        }
    }
}

impl IntrospectConfig {
    /// Validate mount-time invariants.
    ///
    /// # Errors
    ///
    /// Returns [`IntrospectError::Config`] when the mount path does not
    /// start with `/`, is the bare root, or carries a trailing slash.
    pub fn validate(&self) -> Result<()> {
        if !self.mount_path.starts_with('/') {
            return Err(IntrospectError::Config(format!(
                "mount path '{}' must start with '/'",
                self.mount_path
            )));
        }
        if self.mount_path == "/" {
            return Err(IntrospectError::Config(
                "mount path must not be the application root".to_string(),
            ));
        }
        if self.mount_path.ends_with('/') {
            return Err(IntrospectError::Config(format!(
                "mount path '{}' must not end with '/'",
                self.mount_path
            )));
        }
        Ok(())
    }
}
