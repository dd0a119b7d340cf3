//! Configuration for ArborKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for an ArborKV instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// Path of the append-only operation log. Replayed at startup; the
    /// in-memory store is a cache derived from this file.
    pub log_path: PathBuf,

    /// Delete any existing log file before startup, yielding an empty store.
    pub overwrite: bool,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address (host:port). Port 0 binds an ephemeral port.
    pub listen_addr: String,

    /// Connection read timeout in milliseconds (0 = no timeout)
    pub read_timeout_ms: u64,

    /// Connection write timeout in milliseconds (0 = no timeout)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("./arborkv.csv"),
            overwrite: false,
            listen_addr: "127.0.0.1:8088".to_string(),
            read_timeout_ms: 0,
            write_timeout_ms: 0,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the operation log path
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.log_path = path.into();
        self
    }

    /// Delete any existing log file before startup
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.config.overwrite = overwrite;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the read timeout (in milliseconds, 0 disables)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds, 0 disables)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
