use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::graph::{
    OrphanEdges, DEFAULT_DEPTH, DEFAULT_EDGE_LIMIT, MAX_DEPTH, MAX_EDGE_LIMIT, MIN_DEPTH,
    MIN_EDGE_LIMIT,
};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub lobbygraph: LobbyGraphConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub http_server: HttpServerConfig,
}

/// Storage and logging
#[derive(Debug, Clone, Deserialize)]
pub struct LobbyGraphConfig {
    pub db_path: PathBuf,
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Defaults applied to graph requests that omit a parameter
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "default_depth")]
    pub default_depth: usize,
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// `keep` returns edges with unresolved endpoints, `drop` removes them.
    #[serde(default)]
    pub orphan_edges: OrphanEdges,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            default_depth: default_depth(),
            default_limit: default_limit(),
            orphan_edges: OrphanEdges::default(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_http_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub port: u16,
    /// Empty means any origin (local development).
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
            allowed_origins: Vec::new(),
        }
    }
}

fn default_depth() -> usize {
    DEFAULT_DEPTH
}

fn default_limit() -> usize {
    DEFAULT_EDGE_LIMIT
}

fn default_http_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_migrations_dir() -> PathBuf {
    PathBuf::from("migrations")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads `.env` (if present) first. The config path comes from
    /// `LOBBYGRAPH_CONFIG`, falling back to `./config.toml`.
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();

        let config_path = std::env::var("LOBBYGRAPH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        Self::from_file(&config_path)
    }

    /// Parse and validate a specific config file
    pub fn from_file(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.lobbygraph.db_path.as_os_str().is_empty() {
            anyhow::bail!("lobbygraph.db_path must not be empty");
        }

        if !(MIN_DEPTH..=MAX_DEPTH).contains(&self.graph.default_depth) {
            anyhow::bail!(
                "graph.default_depth must be between {} and {}",
                MIN_DEPTH,
                MAX_DEPTH
            );
        }

        if !(MIN_EDGE_LIMIT..=MAX_EDGE_LIMIT).contains(&self.graph.default_limit) {
            anyhow::bail!(
                "graph.default_limit must be between {} and {}",
                MIN_EDGE_LIMIT,
                MAX_EDGE_LIMIT
            );
        }

        if self.http_server.port == 0 {
            anyhow::bail!("http_server.port must be greater than 0");
        }

        for origin in &self.http_server.allowed_origins {
            if axum::http::HeaderValue::from_str(origin).is_err() {
                anyhow::bail!("http_server.allowed_origins contains an invalid origin: {:?}", origin);
            }
        }

        Ok(())
    }

    pub fn db_path(&self) -> &Path {
        &self.lobbygraph.db_path
    }

    pub fn migrations_dir(&self) -> &Path {
        &self.lobbygraph.migrations_dir
    }
}
