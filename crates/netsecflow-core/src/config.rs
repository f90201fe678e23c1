// ── Runtime connection configuration ──
//
// Describes how to reach the ONOS controller. Carries credentials and
// transport tuning but never touches disk; netsecflow-config builds one
// of these from files, env and keyring.

use std::time::Duration;

use netsecflow_api::{BasicAuth, OnosClient, TlsMode, TransportConfig};
use secrecy::SecretString;
use tracing::info;
use url::Url;

use crate::error::CoreError;
use crate::settings::{CONTROLLER_IP_KEY, SettingsStore};

/// REST port ONOS listens on when only a host is configured.
pub const DEFAULT_ONOS_PORT: u16 = 8181;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed lab controllers).
    DangerAcceptInvalid,
}

/// Configuration for talking to a single controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Controller root, e.g. `http://192.168.102.2:8181`.
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ControllerConfig {
    pub fn new(url: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            url,
            username: username.into(),
            password,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Build a controller URL from a bare host or address.
    pub fn url_for_host(host: &str) -> Result<Url, CoreError> {
        let host = host.trim();
        let raw = if host.contains("://") {
            host.to_owned()
        } else if host.contains(':') {
            format!("http://{host}")
        } else {
            format!("http://{host}:{DEFAULT_ONOS_PORT}")
        };
        Url::parse(&raw).map_err(|e| CoreError::Config {
            message: format!("invalid controller address {host:?}: {e}"),
        })
    }

    /// Re-read the `SDN Controller IP` setting; when present it replaces
    /// the configured URL. Absent or blank leaves the config unchanged.
    pub async fn with_settings_override<S: SettingsStore>(
        mut self,
        settings: &S,
    ) -> Result<Self, CoreError> {
        if let Some(host) = settings.get(CONTROLLER_IP_KEY).await? {
            if !host.trim().is_empty() {
                self.url = Self::url_for_host(&host)?;
                info!(url = %self.url, "controller address overridden from settings");
            }
        }
        Ok(self)
    }

    pub fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig::default().with_tls(tls).with_timeout(self.timeout)
    }

    /// Build the REST client this config describes.
    pub fn client(&self) -> Result<OnosClient, CoreError> {
        let auth = BasicAuth {
            username: self.username.clone(),
            password: self.password.clone(),
        };
        Ok(OnosClient::new(self.url.as_str(), Some(auth), &self.transport())?)
    }
}
