// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as valid bind addresses, non-empty paths, and positive capacities.

use crate::diagnostic::ConfigError;
use crate::model::{EncoreConfig, StorageBackend};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &EncoreConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.server.port == 0 {
        errors.push(ConfigError::Validation {
            message: "server.port must not be 0".to_string(),
        });
    }

    if config.storage.backend == StorageBackend::Sqlite
        && config.storage.database_path.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty when storage.backend = \"sqlite\""
                .to_string(),
        });
    }

    if config.queue.notification_capacity == 0 {
        errors.push(ConfigError::Validation {
            message: "queue.notification_capacity must be at least 1".to_string(),
        });
    }

    if config.queue.broadcast_capacity == 0 {
        errors.push(ConfigError::Validation {
            message: "queue.broadcast_capacity must be at least 1".to_string(),
        });
    }

    if config.queue.unspecified_artist.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "queue.unspecified_artist must not be empty".to_string(),
        });
    }

    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
