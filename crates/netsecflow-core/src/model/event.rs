// ── Detector events ──
//
// Events arrive pre-scored from external detectors. The `source` field is
// kept as the raw string so that an unknown detector is a policy rejection
// rather than a decode failure.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::CoreError;

/// Known telemetry producers and how much their scores are trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum DetectorSource {
    #[strum(serialize = "Netflow")]
    Netflow,
    #[strum(serialize = "AD-logs")]
    AdLogs,
    #[strum(serialize = "Honeypot")]
    Honeypot,
    #[strum(serialize = "dns-logs")]
    DnsLogs,
    #[strum(serialize = "EDR")]
    Edr,
    #[strum(serialize = "IDS")]
    Ids,
}

impl DetectorSource {
    /// Weight applied to this detector's raw score.
    pub fn confidence(self) -> f64 {
        match self {
            Self::Netflow => 0.2,
            Self::AdLogs => 0.3,
            Self::Honeypot => 0.8,
            Self::DnsLogs => 0.25,
            Self::Edr => 0.7,
            Self::Ids => 0.6,
        }
    }
}

/// Operator-selected sensitivity, stored under the `Mode` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum DetectionMode {
    Strict,
    Balanced,
    Loose,
}

impl DetectionMode {
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Strict => 0.8,
            Self::Balanced => 0.5,
            Self::Loose => 0.2,
        }
    }

    /// Parse the stored `Mode` setting.
    pub fn from_setting(value: &str) -> Result<Self, CoreError> {
        Self::from_str(value.trim()).map_err(|_| CoreError::UnknownMode {
            mode: value.to_owned(),
        })
    }
}

/// A scored detection about one source address.
///
/// Accepts both the camelCase keys and the capitalized keys older
/// producers send (`Source`, `SourceIP`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(alias = "Source")]
    pub source: String,
    #[serde(default, alias = "Event")]
    pub event: String,
    #[serde(alias = "Score")]
    pub score: f64,
    #[serde(rename = "sourceIP", alias = "SourceIP")]
    pub source_ip: String,
    #[serde(default, rename = "destinationIP", alias = "DestinationIP")]
    pub destination_ip: String,
    #[serde(default = "Utc::now", alias = "Timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(
        source: impl Into<String>,
        score: f64,
        source_ip: impl Into<String>,
        destination_ip: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            event: String::new(),
            score,
            source_ip: source_ip.into(),
            destination_ip: destination_ip.into(),
            timestamp: Utc::now(),
        }
    }

    /// Resolve the detector, rejecting names outside the known set.
    pub fn detector(&self) -> Result<DetectorSource, CoreError> {
        DetectorSource::from_str(&self.source).map_err(|_| CoreError::UnknownSource {
            source_name: self.source.clone(),
        })
    }
}
