use crate::database::StoreConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Settings for the JSON-RPC server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address to bind.
    pub host: String,
    /// Port to bind; 0 picks a free one.
    pub port: u16,
    /// Worker threads of the HTTP server.
    pub threads: usize,
    /// JSON snapshot to load at start-up and rewrite after every change.
    /// `None` keeps the store in memory only.
    pub data_file: Option<PathBuf>,
    pub session_ttl: Duration,
    pub store: StoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            threads: 3,
            data_file: None,
            session_ttl: Duration::from_secs(3600),
            store: StoreConfig::default(),
        }
    }
}
