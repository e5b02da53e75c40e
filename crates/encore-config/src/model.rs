// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Encore configuration.
///
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EncoreConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Queue engine behavior.
    #[serde(default)]
    pub queue: QueueConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EncoreConfig {
    /// Render the effective configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind. `0` picks a free port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allow cross-origin requests from any origin (guest and DJ screens
    /// are usually served from a different host).
    #[serde(default = "default_cors_permissive")]
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_permissive: default_cors_permissive(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_cors_permissive() -> bool {
    true
}

/// Which request-store implementation to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Volatile in-process store. State is lost on restart.
    Memory,
    /// SQLite database file.
    #[default]
    Sqlite,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("encore").join("encore.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("encore.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Queue engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    /// Maximum number of notifications kept; the oldest are dropped first.
    #[serde(default = "default_notification_capacity")]
    pub notification_capacity: usize,

    /// Artist name stored when a guest leaves it blank.
    #[serde(default = "default_unspecified_artist")]
    pub unspecified_artist: String,

    /// Events buffered per realtime observer before a slow observer starts
    /// skipping.
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            notification_capacity: default_notification_capacity(),
            unspecified_artist: default_unspecified_artist(),
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

fn default_notification_capacity() -> usize {
    50
}

fn default_unspecified_artist() -> String {
    "unspecified".to_string()
}

fn default_broadcast_capacity() -> usize {
    256
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
