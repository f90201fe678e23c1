//! Configuration for netsecflow.
//!
//! A TOML file at the platform config path, overlaid with
//! `NETSECFLOW_`-prefixed environment variables (nested keys use `__`,
//! e.g. `NETSECFLOW_CONTROLLER__URL`). The controller password is resolved
//! from an env var, then the system keyring, then plaintext in the file.
//! Everything is translated into `netsecflow_core` runtime types.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use netsecflow_core::{ControllerConfig, ResponseProfile, Thresholds, TlsVerification};

/// Keyring service name for stored controller passwords.
pub const KEYRING_SERVICE: &str = "netsecflow";
/// Env var consulted for the password when `password_env` is unset.
pub const DEFAULT_PASSWORD_ENV: &str = "NETSECFLOW_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for controller user '{username}'")]
    NoCredentials { username: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub controller: ControllerSection,

    /// Risk bounds for each escalation tier.
    #[serde(default)]
    pub thresholds: Thresholds,

    /// Parameters of the automated countermeasures.
    #[serde(default)]
    pub response: ResponseProfile,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ControllerSection {
    /// Controller root URL or bare host (port 8181 is assumed).
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default = "default_username")]
    pub username: String,

    /// Plaintext password. Prefer the keyring or an env var.
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for ControllerSection {
    fn default() -> Self {
        Self {
            url: default_url(),
            username: default_username(),
            password: None,
            password_env: None,
            ca_cert: None,
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_url() -> String {
    "http://127.0.0.1:8181".into()
}
fn default_username() -> String {
    "onos".into()
}
fn default_timeout() -> u64 {
    30
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "netsecflow", "netsecflow").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("netsecflow");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` + environment. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("NETSECFLOW_").split("__"));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Validation ──────────────────────────────────────────────────────

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds
            .validate()
            .map_err(|e| ConfigError::Validation {
                field: "thresholds".into(),
                reason: e.to_string(),
            })?;

        if self.response.rate_limit == 0 {
            return Err(ConfigError::Validation {
                field: "response.rate_limit".into(),
                reason: "must be positive".into(),
            });
        }
        if self.response.intermediate_device.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "response.intermediate_device".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.controller.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "controller.timeout".into(),
                reason: "must be at least one second".into(),
            });
        }
        Ok(())
    }
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the controller password: env var, then keyring, then plaintext.
pub fn resolve_password(section: &ControllerSection) -> Result<SecretString, ConfigError> {
    // 1. Env var
    let env_name = section
        .password_env
        .as_deref()
        .unwrap_or(DEFAULT_PASSWORD_ENV);
    if let Ok(pw) = std::env::var(env_name) {
        return Ok(SecretString::from(pw));
    }

    // 2. Keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{}/password", section.username)) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = section.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        username: section.username.clone(),
    })
}

// ── Translation to runtime types ────────────────────────────────────

/// Build a `ControllerConfig` from the `[controller]` section.
pub fn to_controller_config(cfg: &Config) -> Result<ControllerConfig, ConfigError> {
    let section = &cfg.controller;
    let url = ControllerConfig::url_for_host(&section.url).map_err(|e| ConfigError::Validation {
        field: "controller.url".into(),
        reason: e.to_string(),
    })?;

    let password = resolve_password(section)?;

    let tls = if section.insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = section.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(ControllerConfig {
        url,
        username: section.username.clone(),
        password,
        tls,
        timeout: Duration::from_secs(section.timeout),
    })
}
