use thiserror::Error;

/// Top-level error type for the `netsecflow-api` crate.
///
/// Covers every failure mode of the controller REST surface: authentication,
/// transport, unexpected status codes, and response decoding.
/// `netsecflow-core` maps these into its transport error class.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Controller rejected the basic-auth credentials.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Controller ──────────────────────────────────────────────────
    /// The controller answered with a status other than the one the
    /// endpoint promises on success (e.g. anything but 201 for a create).
    #[error("Controller returned HTTP {status} (expected {expected}): {message}")]
    UnexpectedStatus {
        status: u16,
        expected: u16,
        message: String,
    },

    /// Meter POST succeeded but the assigned meter could not be located
    /// afterwards, so nothing may reference it.
    #[error("Meter creation on {device_id} could not be confirmed")]
    MeterNotConfirmed { device_id: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the controller rejected our credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error. Nothing in this crate
    /// retries; callers use this only to word their reports.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::UnexpectedStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::UnexpectedStatus { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status reported by the controller, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
