//! Decision layer between detector telemetry and the ONOS controller.
//!
//! - **[`RiskLedger`]**: per-source accumulated risk stored through a
//!   [`SettingsStore`], with read-then-write updates serialized per key.
//!
//! - **[`EscalationPolicy`]**: pure mapping from detector, score, detection
//!   mode and accumulated risk to an [`ActionTier`].
//!
//! - **[`TopologyGraph`]**: weighted view of a controller topology snapshot
//!   with host resolution and Dijkstra shortest paths.
//!
//! - **[`ActionSynthesizer`]**: builds ACL rules, meters, flow rules and
//!   intents, audits them through an [`AuditLog`], and issues them through a
//!   [`ControlPlane`] (implemented for `netsecflow_api::OnosClient`).
//!
//! - **[`Responder`]**: drives one [`Event`] through all of the above and
//!   reports an [`EventOutcome`].

pub mod audit;
pub mod config;
pub mod control;
pub mod error;
pub mod ip;
pub mod model;
pub mod policy;
pub mod responder;
pub mod risk;
pub mod settings;
pub mod synth;
pub mod topology;

// ── Primary re-exports ──────────────────────────────────────────────
pub use audit::{AuditLog, MemoryAuditLog};
pub use config::{ControllerConfig, TlsVerification};
pub use control::ControlPlane;
pub use error::{CoreError, ErrorKind};
pub use policy::{Decision, EscalationPolicy, Thresholds};
pub use responder::{EventOutcome, Responder};
pub use risk::RiskLedger;
pub use settings::{MemorySettings, SettingsStore};
pub use synth::{AclMatch, ActionSynthesizer, ResponseProfile};
pub use topology::{HostAttachment, Route, TopologyGraph};

pub use model::{
    ActionKind, ActionRecord, ActionTier, DetectionMode, DetectorSource, Event, Origin,
};
