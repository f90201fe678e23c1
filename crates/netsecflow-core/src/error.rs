// ── Core error types ──
//
// Domain-level errors from netsecflow-core. Controller failures arrive as
// `netsecflow_api::Error` and are folded into the transport class by the
// `From` impl below; callers branch on `kind()` rather than on variants.

use thiserror::Error;

/// Coarse classification used by callers to decide how to report a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ErrorKind {
    /// Malformed input: bad IP, unknown source or mode, missing settings.
    Validation,
    /// Something the topology or controller state could not locate.
    Resolution,
    /// The controller answered badly or not at all.
    Transport,
    /// Storage or configuration trouble on our side.
    Internal,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Validation errors ────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Invalid IP address or CIDR: {value}")]
    InvalidIp { value: String },

    #[error("Unknown detector source: {source_name}")]
    UnknownSource { source_name: String },

    #[error("Unknown detection mode: {mode}")]
    UnknownMode { mode: String },

    #[error("Required setting is missing: {key}")]
    MissingSetting { key: String },

    // ── Resolution errors ────────────────────────────────────────────
    #[error("No host with IP {ip} in topology")]
    HostNotFound { ip: String },

    #[error("Host {ip} has no attachment point")]
    HostUnlocated { ip: String },

    #[error("Host {ip} has no known MAC address")]
    HostMacUnknown { ip: String },

    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    #[error("No direct link from {from} to {to}")]
    NoDirectLink { from: String, to: String },

    #[error("No path from {from} to {to}")]
    NoPath { from: String, to: String },

    #[error("Entity not found: {entity_type} with id {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Transport errors (wrapped, not exposed raw) ──────────────────
    #[error("Cannot connect to controller at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Controller request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Settings storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ValidationFailed { .. }
            | Self::InvalidIp { .. }
            | Self::UnknownSource { .. }
            | Self::UnknownMode { .. }
            | Self::MissingSetting { .. } => ErrorKind::Validation,
            Self::HostNotFound { .. }
            | Self::HostUnlocated { .. }
            | Self::HostMacUnknown { .. }
            | Self::DeviceNotFound { .. }
            | Self::NoDirectLink { .. }
            | Self::NoPath { .. }
            | Self::NotFound { .. } => ErrorKind::Resolution,
            Self::ConnectionFailed { .. }
            | Self::AuthenticationFailed { .. }
            | Self::Timeout { .. }
            | Self::Api { .. } => ErrorKind::Transport,
            Self::Storage { .. } | Self::Config { .. } => ErrorKind::Internal,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<netsecflow_api::Error> for CoreError {
    fn from(err: netsecflow_api::Error) -> Self {
        match err {
            netsecflow_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            netsecflow_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            netsecflow_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid controller URL: {e}"),
            },
            netsecflow_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            netsecflow_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            netsecflow_api::Error::UnexpectedStatus {
                status,
                expected,
                message,
            } => CoreError::Api {
                message: format!("HTTP {status} (expected {expected}): {message}"),
                status: Some(status),
            },
            netsecflow_api::Error::MeterNotConfirmed { device_id } => CoreError::Api {
                message: format!("meter creation on {device_id} could not be confirmed"),
                status: None,
            },
            netsecflow_api::Error::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("Undecodable controller response: {message}"),
                status: None,
            },
        }
    }
}
