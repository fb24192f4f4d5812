//! Configuration Management
//!
//! Connection settings for a GeoServer instance plus the database
//! connection parameters handed to datastores. The shape mirrors the
//! `{ geoserverConnection: {...}, database: { flat: {...} } }` documents
//! used by deployments, in either JSON or YAML.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CONTEXT: &str = "geoserver";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_CONCURRENCY: usize = 5;

/// Top-level repository configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryConfig {
    pub geoserver_connection: ConnectionConfig,
    /// Connection parameters keyed by datastore name, passed through as-is
    #[serde(default)]
    pub database: HashMap<String, Map<String, Value>>,
}

/// How to reach the GeoServer and which defaults to apply
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    /// Full server root (e.g. `http://host:8080/geoserver`); wins over host/port/context
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_context")]
    pub context: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    /// Workspace used when a resource config names none
    #[serde(default)]
    pub workspace: Option<String>,
    /// Datastore used when a resource config names none
    #[serde(default)]
    pub datastore: Option<String>,
    /// Request timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Maximum in-flight requests for batch operations
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_context() -> String {
    DEFAULT_CONTEXT.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: default_host(),
            port: default_port(),
            context: default_context(),
            user: String::new(),
            password: String::new(),
            workspace: None,
            datastore: None,
            timeout: default_timeout(),
            concurrency: default_concurrency(),
        }
    }
}

impl ConnectionConfig {
    /// Base URL of the REST API, always ending in `/rest`
    pub fn rest_url(&self) -> Result<String> {
        let root = match &self.url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => {
                let context = self.context.trim_matches('/');
                if context.is_empty() {
                    format!("http://{}:{}", self.host, self.port)
                } else {
                    format!("http://{}:{}/{}", self.host, self.port, context)
                }
            }
        };

        url::Url::parse(&root)
            .map_err(|e| Error::Config(format!("invalid GeoServer URL '{}': {}", root, e)))?;

        Ok(format!("{}/rest", root))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    /// Batch window, never zero
    pub fn concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

impl RepositoryConfig {
    /// Get the default config file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gsrest").join("config.yaml"))
    }

    /// Load configuration from a JSON or YAML file (chosen by extension)
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );

        if is_yaml {
            Self::from_yaml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Connection parameters registered for a datastore name
    pub fn connection_parameters(&self, datastore: &str) -> Option<&Map<String, Value>> {
        self.database.get(datastore)
    }
}
