// ── Domain model ──
//
// Inbound detector events, the enumerations the escalation policy keys on,
// and the audit record written before every controller mutation.

pub mod action;
pub mod event;

// ── Re-exports ──────────────────────────────────────────────────────

pub use action::{ActionKind, ActionRecord, ActionTier, Origin};
pub use event::{DetectionMode, DetectorSource, Event};
