//! Configuration file handling and the resolved run configuration
//!
//! The optional config file supplies defaults for the server connection;
//! command-line flags always win. The resolved [`RunConfig`] is the single
//! read-only value object handed down to the runners.

use serde::Deserialize;

use super::paths::config_path;
use super::Result;

/// Main configuration structure (`config.toml`)
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Remote command server defaults
    #[serde(default)]
    pub server: ServerConfig,

    /// Run defaults
    #[serde(default)]
    pub run: RunDefaults,
}

/// Remote command server settings
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Server hostname
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Browser launch specifier, e.g. `*firefox`
    #[serde(default = "default_browser")]
    pub browser: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            browser: default_browser(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}
fn default_port() -> u16 {
    4444
}
fn default_browser() -> String {
    "*opera".to_string()
}

/// Run defaults
#[derive(Debug, Deserialize, Default)]
pub struct RunDefaults {
    /// Base URL for relative URLs in test documents
    #[serde(default)]
    pub baseurl: Option<String>,
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if the file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                let content =
                    std::fs::read_to_string(&path).map_err(|e| super::Error::FileRead {
                        path: path.display().to_string(),
                        error: e.to_string(),
                    })?;
                return toml::from_str(&content)
                    .map_err(|e| super::Error::ConfigParse(e.to_string()));
            }
        }
        Ok(Self::default())
    }
}

/// Resolved run configuration, read-only during execution
///
/// Inherited unchanged by every test in a suite; the session itself is
/// never shared.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub host: String,
    pub port: u16,
    pub browser: String,
    pub base_url: Option<String>,
    pub verbose: bool,
}

impl RunConfig {
    /// URL of the remote command server's driver endpoint
    pub fn server_url(&self) -> String {
        format!(
            "http://{}:{}{}",
            self.host,
            self.port,
            crate::rc::wire::DRIVER_PATH
        )
    }
}
