//! Configuration loading and management
//!
//! The service reads one YAML document. Every section is optional; a missing
//! section falls back to [`AppConfig::default_config`].
//!
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 8080
//! ledger:
//!   allow_overpayment: false
//! cors:
//!   allowed_origins: ["http://localhost:5173"]
//! roles:
//!   clerk:
//!     notice_audiences: [Everyone]
//!     record_payments: true
//! seed: demos/seed.yaml
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::{Capabilities, CapabilityTable, Role};

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "EDUVERSE_CONFIG";

/// Environment variable overriding the bind address (`host:port`)
pub const BIND_ADDR_ENV: &str = "EDUVERSE_ADDR";

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Payment rules
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LedgerConfig {
    /// Accept payments larger than the selected invoice's outstanding amount
    pub allow_overpayment: bool,
}

/// Cross-origin settings for browser clients
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CorsConfig {
    /// Empty means no CORS layer; `"*"` allows any origin
    pub allowed_origins: Vec<String>,
}

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub ledger: LedgerConfig,
    pub cors: CorsConfig,

    /// Per-role capability overrides; roles not listed keep the built-in entry
    pub roles: Option<HashMap<Role, Capabilities>>,

    /// Seed file applied once at startup
    pub seed: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from a YAML file
    ///
    /// A relative `seed` path is resolved against the config file's directory.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let mut config = Self::from_yaml_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;

        if let (Some(seed), Some(dir)) = (config.seed.as_mut(), path.parent()) {
            if seed.is_relative() && !dir.as_os_str().is_empty() {
                *seed = dir.join(&*seed);
            }
        }
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default_config());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Built-in configuration: localhost:3000, strict ledger, default roles
    pub fn default_config() -> Self {
        Self::default()
    }

    /// File named by `EDUVERSE_CONFIG` if set, defaults otherwise, then the
    /// `EDUVERSE_ADDR` override
    pub fn load_from_env() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_yaml_file(PathBuf::from(path))?,
            None => Self::default_config(),
        };

        if let Ok(addr) = std::env::var(BIND_ADDR_ENV) {
            let parsed: SocketAddr = addr
                .parse()
                .with_context(|| format!("{} is not a valid socket address: {}", BIND_ADDR_ENV, addr))?;
            config.server.host = parsed.ip().to_string();
            config.server.port = parsed.port();
        }
        Ok(config)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let raw = format!("{}:{}", self.server.host, self.server.port);
        raw.parse()
            .with_context(|| format!("invalid server address {}", raw))
    }

    /// Built-in capability table with this config's overrides applied
    pub fn capability_table(&self) -> CapabilityTable {
        match &self.roles {
            Some(overrides) => CapabilityTable::defaults().with_overrides(overrides),
            None => CapabilityTable::defaults(),
        }
    }
}
