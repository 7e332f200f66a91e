// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup. Invalid values
//! abort startup with a [`ConfigError`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Root directory for persisted collections | `./data` |
//! | `STORAGE_BACKEND` | `file` or `redb` | `file` |
//! | `WHITELISTED_ADDRESSES` | Comma-separated wallet addresses | built-in list |
//! | `PROTECTED_ROUTES` | Comma-separated gated path prefixes | `/users,/listing,/profile,/tokenize` |
//! | `PUBLIC_ROUTES` | Comma-separated always-open path prefixes | `/,/access-denied` |
//! | `ACCESS_DENIED_PATH` | Redirect target for denied requests | `/access-denied` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    str::FromStr,
};

use thiserror::Error;

use crate::{
    auth::gate::GateConfig,
    storage::{paths::DATA_ROOT, StorageBackend},
};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const STORAGE_BACKEND_ENV: &str = "STORAGE_BACKEND";
pub const WHITELIST_ENV: &str = "WHITELISTED_ADDRESSES";
pub const PROTECTED_ROUTES_ENV: &str = "PROTECTED_ROUTES";
pub const PUBLIC_ROUTES_ENV: &str = "PUBLIC_ROUTES";
pub const ACCESS_DENIED_PATH_ENV: &str = "ACCESS_DENIED_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

impl ConfigError {
    fn invalid(key: &str, reason: impl ToString) -> Self {
        Self::InvalidEnvVar(key.to_string(), reason.to_string())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format `{other}` (expected json or pretty)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub data_dir: PathBuf,
    pub storage_backend: StorageBackend,
    pub gate: GateConfig,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let host = get(HOST_ENV)
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
            .trim()
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::invalid(HOST_ENV, e))?;

        let port = match get(PORT_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid(PORT_ENV, e))?,
            None => DEFAULT_PORT,
        };

        let data_dir = PathBuf::from(get(DATA_DIR_ENV).unwrap_or_else(|| DATA_ROOT.to_string()));

        let storage_backend = match get(STORAGE_BACKEND_ENV) {
            Some(raw) => raw
                .parse()
                .map_err(|e: String| ConfigError::invalid(STORAGE_BACKEND_ENV, e))?,
            None => StorageBackend::default(),
        };

        let log_format = match get(LOG_FORMAT_ENV) {
            Some(raw) => raw
                .parse()
                .map_err(|e: String| ConfigError::invalid(LOG_FORMAT_ENV, e))?,
            None => LogFormat::default(),
        };

        let defaults = GateConfig::default();
        let whitelist = get(WHITELIST_ENV)
            .map(|raw| split_list(&raw))
            .unwrap_or(defaults.whitelist);
        let protected_routes = match get(PROTECTED_ROUTES_ENV) {
            Some(raw) => routes(PROTECTED_ROUTES_ENV, &raw)?,
            None => defaults.protected_routes,
        };
        let public_routes = match get(PUBLIC_ROUTES_ENV) {
            Some(raw) => routes(PUBLIC_ROUTES_ENV, &raw)?,
            None => defaults.public_routes,
        };
        let access_denied_path = match get(ACCESS_DENIED_PATH_ENV) {
            Some(raw) => route(ACCESS_DENIED_PATH_ENV, raw.trim())?,
            None => defaults.access_denied_path,
        };

        Ok(Self {
            host,
            port,
            data_dir,
            storage_backend,
            gate: GateConfig::new(whitelist, protected_routes, public_routes, access_denied_path),
            log_format,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn route(key: &str, value: &str) -> Result<String, ConfigError> {
    if value.starts_with('/') {
        Ok(value.to_string())
    } else {
        Err(ConfigError::invalid(key, format!("route `{value}` must start with `/`")))
    }
}

fn routes(key: &str, raw: &str) -> Result<Vec<String>, ConfigError> {
    split_list(raw)
        .iter()
        .map(|value| route(key, value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = config(&[]).unwrap();
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.storage_backend, StorageBackend::File);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.gate.access_denied_path, "/access-denied");
        assert_eq!(config.gate.protected_routes.len(), 4);
        assert_eq!(config.gate.whitelist.len(), 2);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "3001"),
            ("DATA_DIR", "/var/lib/estate"),
            ("STORAGE_BACKEND", "redb"),
            ("LOG_FORMAT", "json"),
            ("WHITELISTED_ADDRESSES", " 0xABC , ,0xdef"),
            ("PROTECTED_ROUTES", "/admin"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:3001");
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/estate"));
        assert_eq!(config.storage_backend, StorageBackend::Redb);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.gate.whitelist, vec!["0xabc", "0xdef"]);
        assert_eq!(config.gate.protected_routes, vec!["/admin"]);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config(&[("PORT", "  "), ("STORAGE_BACKEND", "")]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.storage_backend, StorageBackend::File);
    }

    #[test]
    fn invalid_values_fail() {
        let err = config(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "PORT"));

        assert!(config(&[("STORAGE_BACKEND", "postgres")]).is_err());
        assert!(config(&[("LOG_FORMAT", "xml")]).is_err());
        assert!(config(&[("HOST", "not-an-ip")]).is_err());
        assert!(config(&[("PUBLIC_ROUTES", "/,home")]).is_err());
    }
}
