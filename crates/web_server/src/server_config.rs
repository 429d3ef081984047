use std::env;
use std::path::{Path, PathBuf};

/// Address used when `BIND_ADDRESS` is not set
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Settings of the HTTP server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// `host:port` to listen on
    pub bind_address: String,
    /// Directory with the built frontend, if one should be served
    pub frontend_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            frontend_path: None,
        }
    }
}

impl ServerConfig {
    /// Reads `BIND_ADDRESS` and `FRONTEND_PATH`
    pub fn from_env() -> Self {
        let bind_address = env::var("BIND_ADDRESS")
            .ok()
            .filter(|address| !address.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let frontend_path = env::var("FRONTEND_PATH")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Self {
            bind_address,
            frontend_path,
        }
    }

    /// Frontend directory, only when it exists on disk
    pub fn existing_frontend_path(&self) -> Option<&Path> {
        self.frontend_path
            .as_deref()
            .filter(|path| path.is_dir())
    }
}
