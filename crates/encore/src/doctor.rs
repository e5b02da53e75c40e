// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `encore doctor` command implementation.
//!
//! Runs quick diagnostic checks against the loaded configuration: the
//! request store opens and answers a ping, and the listen address is free.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use encore_config::model::{EncoreConfig, StorageBackend};
use encore_core::HealthStatus;

/// Status of a diagnostic check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: &'static str,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &'static str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name,
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run all checks and print a report. Returns false if any check failed.
pub async fn run_doctor(config: &EncoreConfig, plain: bool) -> bool {
    let use_color = !plain && std::io::stdout().is_terminal();
    let results = vec![
        check_config(config),
        check_storage(config).await,
        check_listen_address(config).await,
    ];

    println!();
    println!("  encore doctor");
    println!("  {}", "-".repeat(50));
    for result in &results {
        println!("{}", render_line(result, use_color));
    }
    println!();

    let failures = results.iter().filter(|r| r.status == CheckStatus::Fail).count();
    let warnings = results.iter().filter(|r| r.status == CheckStatus::Warn).count();
    match failures + warnings {
        0 => println!("  All checks passed."),
        1 => println!("  1 issue found."),
        n => println!("  {n} issues found."),
    }
    println!();

    failures == 0
}

fn render_line(result: &CheckResult, use_color: bool) -> String {
    let ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green(), result.message.normal()),
            CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
            CheckStatus::Fail => ("✗".red(), result.message.red()),
        };
        format!("    {symbol} {:<20} {message} ({ms}ms)", result.name)
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!("    {tag} {:<20} {} ({ms}ms)", result.name, result.message)
    }
}

/// Configuration has already been loaded and validated by the time doctor runs.
fn check_config(config: &EncoreConfig) -> CheckResult {
    let start = Instant::now();
    let backend = match config.storage.backend {
        StorageBackend::Memory => "memory backend (orders are lost on restart)".to_string(),
        StorageBackend::Sqlite => format!("sqlite at {}", config.storage.database_path),
    };
    let status = match config.storage.backend {
        StorageBackend::Memory => CheckStatus::Warn,
        StorageBackend::Sqlite => CheckStatus::Pass,
    };
    CheckResult::new("Configuration", status, backend, start)
}

async fn check_storage(config: &EncoreConfig) -> CheckResult {
    let start = Instant::now();
    let store = match encore_storage::open_store(&config.storage).await {
        Ok(store) => store,
        Err(e) => return CheckResult::new("Storage", CheckStatus::Fail, format!("open failed: {e}"), start),
    };

    let result = match store.health_check().await {
        Ok(HealthStatus::Healthy) => match store.load_orders().await {
            Ok(orders) => CheckResult::new(
                "Storage",
                CheckStatus::Pass,
                format!("connected ({} orders)", orders.len()),
                start,
            ),
            Err(e) => CheckResult::new("Storage", CheckStatus::Fail, format!("read failed: {e}"), start),
        },
        Ok(HealthStatus::Degraded(msg)) => CheckResult::new("Storage", CheckStatus::Warn, msg, start),
        Ok(HealthStatus::Unhealthy(msg)) => CheckResult::new("Storage", CheckStatus::Fail, msg, start),
        Err(e) => CheckResult::new("Storage", CheckStatus::Fail, format!("ping failed: {e}"), start),
    };
    let _ = store.close().await;
    result
}

async fn check_listen_address(config: &EncoreConfig) -> CheckResult {
    let start = Instant::now();
    let addr = format!("{}:{}", config.server.host, config.server.port);
    match tokio::net::TcpListener::bind(&addr).await {
        Ok(_) => CheckResult::new("Listen address", CheckStatus::Pass, format!("{addr} is free"), start),
        Err(e) => CheckResult::new(
            "Listen address",
            CheckStatus::Warn,
            format!("cannot bind {addr}: {e}"),
            start,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> EncoreConfig {
        let mut config = EncoreConfig::default();
        config.storage.backend = StorageBackend::Memory;
        config.server.host = "127.0.0.1".into();
        config.server.port = 0;
        config
    }

    #[tokio::test]
    async fn storage_check_passes_for_memory() {
        let result = check_storage(&memory_config()).await;
        assert_eq!(result.status, CheckStatus::Pass);
        assert!(result.message.contains("0 orders"));
    }

    #[tokio::test]
    async fn ephemeral_port_is_free() {
        let result = check_listen_address(&memory_config()).await;
        assert_eq!(result.status, CheckStatus::Pass);
    }

    #[test]
    fn memory_backend_is_a_warning() {
        assert_eq!(check_config(&memory_config()).status, CheckStatus::Warn);
    }

    #[test]
    fn plain_rendering_uses_tags() {
        let result = CheckResult {
            name: "Storage",
            status: CheckStatus::Fail,
            message: "open failed".into(),
            duration: Duration::from_millis(3),
        };
        let line = render_line(&result, false);
        assert!(line.contains("[FAIL]"));
        assert!(line.contains("open failed (3ms)"));
    }

    #[tokio::test]
    async fn doctor_succeeds_with_memory_backend() {
        assert!(run_doctor(&memory_config(), true).await);
    }
}
