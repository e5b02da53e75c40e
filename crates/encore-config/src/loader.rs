// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./encore.toml` > `~/.config/encore/encore.toml` > `/etc/encore/encore.toml`
//! with environment variable overrides via the `ENCORE_` prefix and the
//! conventional `PORT` variable.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::EncoreConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/encore/encore.toml`
/// 3. `~/.config/encore/encore.toml`
/// 4. `./encore.toml`
/// 5. `PORT`
/// 6. `ENCORE_*` environment variables
pub fn load_config() -> Result<EncoreConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<EncoreConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(EncoreConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<EncoreConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(EncoreConfig::default()))
        .merge(Toml::file(path))
        .merge(port_provider())
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(EncoreConfig::default()))
        .merge(Toml::file("/etc/encore/encore.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("encore/encore.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("encore.toml"))
        .merge(port_provider())
        .merge(env_provider())
}

/// Hosting platforms hand the listen port over as a bare `PORT` variable.
fn port_provider() -> Env {
    Env::raw().only(&["port"]).map(|_| "server.port".into())
}

/// Environment provider with explicit section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so underscore-containing
/// keys survive: `ENCORE_QUEUE_NOTIFICATION_CAPACITY` must map to
/// `queue.notification_capacity`, not `queue.notification.capacity`.
fn env_provider() -> Env {
    Env::prefixed("ENCORE_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("queue_", "queue.", 1)
            .replacen("logging_", "logging.", 1);
        mapped.into()
    })
}
