// ── Escalation driver ──
//
// Event -> ledger update -> tier -> synthesizer call. Mode and honeypot
// address are read from settings for every event so operator changes apply
// immediately. Invalid input ends in `Rejected` without touching the
// ledger; controller failures end in `ExecutionFailed` after the risk has
// already been recorded.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::audit::AuditLog;
use crate::control::ControlPlane;
use crate::error::CoreError;
use crate::ip::{self, HOST_PREFIX};
use crate::model::{ActionTier, DetectionMode, Event, Origin};
use crate::policy::{Decision, EscalationPolicy};
use crate::risk::RiskLedger;
use crate::settings::{HONEYPOT_KEY, MODE_KEY, SettingsStore};
use crate::synth::{AclMatch, ActionSynthesizer};

/// What happened to one event.
#[derive(Debug)]
pub enum EventOutcome {
    /// Input was invalid or settings were missing. Nothing changed.
    Rejected { error: CoreError },
    /// The tier's action (possibly none) completed.
    Executed { decision: Decision },
    /// Risk was updated but the controller action failed.
    ExecutionFailed { decision: Decision, error: CoreError },
}

impl EventOutcome {
    /// Tier names acted on, empty for rejections.
    pub fn actions(&self) -> Vec<ActionTier> {
        match self {
            Self::Rejected { .. } => Vec::new(),
            Self::Executed { decision } | Self::ExecutionFailed { decision, .. } => {
                vec![decision.tier]
            }
        }
    }

    pub fn decision(&self) -> Option<&Decision> {
        match self {
            Self::Rejected { .. } => None,
            Self::Executed { decision } | Self::ExecutionFailed { decision, .. } => Some(decision),
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

pub struct Responder<S, C, A> {
    ledger: Arc<RiskLedger<S>>,
    policy: EscalationPolicy,
    synth: Arc<ActionSynthesizer<C, A>>,
}

struct Validated {
    increase: f64,
    honeypot: String,
}

impl<S, C, A> Responder<S, C, A>
where
    S: SettingsStore,
    C: ControlPlane,
    A: AuditLog,
{
    pub fn new(
        ledger: Arc<RiskLedger<S>>,
        policy: EscalationPolicy,
        synth: Arc<ActionSynthesizer<C, A>>,
    ) -> Self {
        Self {
            ledger,
            policy,
            synth,
        }
    }

    pub fn ledger(&self) -> &Arc<RiskLedger<S>> {
        &self.ledger
    }

    pub fn synthesizer(&self) -> &Arc<ActionSynthesizer<C, A>> {
        &self.synth
    }

    async fn required_setting(&self, key: &str) -> Result<String, CoreError> {
        self.ledger
            .settings()
            .get(key)
            .await?
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| CoreError::MissingSetting { key: key.to_owned() })
    }

    async fn validate(&self, event: &Event) -> Result<Validated, CoreError> {
        let mode = self.required_setting(MODE_KEY).await?;
        let honeypot = self.required_setting(HONEYPOT_KEY).await?;

        let source = event.detector()?;
        let mode = DetectionMode::from_setting(&mode)?;
        ip::validate(&event.source_ip)?;
        let increase = self.policy.increase(source, event.score, mode)?;

        Ok(Validated { increase, honeypot })
    }

    /// Process one event.
    ///
    /// `Err` is reserved for settings storage failures; every other problem
    /// is reported through the outcome.
    pub async fn handle(&self, event: &Event) -> Result<EventOutcome, CoreError> {
        let validated = match self.validate(event).await {
            Ok(v) => v,
            Err(error) if error.kind() == crate::error::ErrorKind::Internal => return Err(error),
            Err(error) => {
                warn!(source = %event.source, source_ip = %event.source_ip, %error, "event rejected");
                return Ok(EventOutcome::Rejected { error });
            }
        };

        let risk = self.ledger.update(&event.source_ip, validated.increase).await?;
        let decision = Decision {
            tier: self.policy.thresholds().tier_for(risk),
            increase: validated.increase,
            risk,
        };
        debug!(
            source_ip = %event.source_ip,
            increase = decision.increase,
            risk = decision.risk,
            tier = %decision.tier,
            "event scored"
        );

        match self.dispatch(decision.tier, &event.source_ip, &validated.honeypot).await {
            Ok(()) => {
                info!(source_ip = %event.source_ip, tier = %decision.tier, risk, "escalation executed");
                Ok(EventOutcome::Executed { decision })
            }
            Err(error) => {
                warn!(source_ip = %event.source_ip, tier = %decision.tier, %error, "escalation failed");
                Ok(EventOutcome::ExecutionFailed { decision, error })
            }
        }
    }

    async fn dispatch(&self, tier: ActionTier, source_ip: &str, honeypot: &str) -> Result<(), CoreError> {
        let origin = Origin::Automated;
        match tier {
            ActionTier::Block => {
                let fields = AclMatch::source(ip::normalize_cidr(source_ip, HOST_PREFIX)?);
                self.synth.block(fields, origin).await
            }
            ActionTier::Redirect => self
                .synth
                .redirect_full(source_ip, honeypot, origin)
                .await
                .map(|_| ()),
            ActionTier::RateLimit => {
                let rate = self.synth.profile().rate_limit;
                self.synth
                    .rate_limit_host(source_ip, rate, origin)
                    .await
                    .map(|_| ())
            }
            ActionTier::IntermediateRedirect => {
                let device = self.synth.profile().intermediate_device.clone();
                self.synth
                    .redirect_to_intermediate(source_ip, &device, origin)
                    .await
            }
            ActionTier::NoAction => Ok(()),
        }
    }
}
