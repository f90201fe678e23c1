// ── Escalation tiers and audit records ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Countermeasure selected for an event, ordered from mildest to harshest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum ActionTier {
    #[strum(serialize = "No Action")]
    #[serde(rename = "No Action")]
    NoAction,
    #[strum(serialize = "Intermediate Redirect")]
    #[serde(rename = "Intermediate Redirect")]
    IntermediateRedirect,
    #[strum(serialize = "Rate Limit")]
    #[serde(rename = "Rate Limit")]
    RateLimit,
    Redirect,
    Block,
}

/// Who triggered an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum Origin {
    Admin,
    Automated,
}

/// Audit category of a controller mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum ActionKind {
    Block,
    Allow,
    Unblock,
    Redirect,
    #[strum(serialize = "Rate Limit")]
    #[serde(rename = "Rate Limit")]
    RateLimit,
}

/// One entry in the append-only action log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    pub timestamp: DateTime<Utc>,
    pub action_type: ActionKind,
    pub reason: String,
    #[serde(rename = "sourceIP")]
    pub source_ip: Option<String>,
    pub origin: Origin,
}

impl ActionRecord {
    pub fn new(
        action_type: ActionKind,
        reason: impl Into<String>,
        source_ip: Option<String>,
        origin: Origin,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            action_type,
            reason: reason.into(),
            source_ip,
            origin,
        }
    }
}
