// ── Escalation policy ──
//
// Pure mapping from (detector, score, mode, accumulated risk) to an action
// tier. No I/O: the responder feeds it the ledger's value and applies the
// returned increase.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{ActionTier, DetectionMode, DetectorSource};

/// Lower bounds (inclusive) of each tier, harshest first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Thresholds {
    pub block: f64,
    pub redirect: f64,
    pub rate_limit: f64,
    pub intermediate_redirect: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            block: 100.0,
            redirect: 60.0,
            rate_limit: 40.0,
            intermediate_redirect: 20.0,
        }
    }
}

impl Thresholds {
    /// Bounds must be finite and strictly descending.
    pub fn validate(&self) -> Result<(), CoreError> {
        let bounds = [
            self.block,
            self.redirect,
            self.rate_limit,
            self.intermediate_redirect,
        ];
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(CoreError::validation("tier thresholds must be finite"));
        }
        if bounds.windows(2).any(|w| w[0] <= w[1]) {
            return Err(CoreError::validation(format!(
                "tier thresholds must be strictly descending, got {bounds:?}"
            )));
        }
        Ok(())
    }

    /// First tier whose bound `risk` reaches, checked high to low.
    pub fn tier_for(&self, risk: f64) -> ActionTier {
        if risk >= self.block {
            ActionTier::Block
        } else if risk >= self.redirect {
            ActionTier::Redirect
        } else if risk >= self.rate_limit {
            ActionTier::RateLimit
        } else if risk >= self.intermediate_redirect {
            ActionTier::IntermediateRedirect
        } else {
            ActionTier::NoAction
        }
    }
}

/// Result of scoring one event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub tier: ActionTier,
    pub increase: f64,
    pub risk: f64,
}

#[derive(Debug, Clone, Default)]
pub struct EscalationPolicy {
    thresholds: Thresholds,
}

impl EscalationPolicy {
    pub fn new(thresholds: Thresholds) -> Result<Self, CoreError> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// `score × confidence × multiplier`. Scores must be finite and non-negative.
    pub fn increase(
        &self,
        source: DetectorSource,
        score: f64,
        mode: DetectionMode,
    ) -> Result<f64, CoreError> {
        if !score.is_finite() || score < 0.0 {
            return Err(CoreError::validation(format!(
                "score must be a finite non-negative number, got {score}"
            )));
        }
        Ok(score * source.confidence() * mode.multiplier())
    }

    pub fn decide(
        &self,
        source: DetectorSource,
        score: f64,
        mode: DetectionMode,
        current_risk: f64,
    ) -> Result<Decision, CoreError> {
        let increase = self.increase(source, score, mode)?;
        let risk = current_risk + increase;
        Ok(Decision {
            tier: self.thresholds.tier_for(risk),
            increase,
            risk,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn policy() -> EscalationPolicy {
        EscalationPolicy::default()
    }

    #[test]
    fn honeypot_balanced_escalates_to_redirect() {
        let d = policy()
            .decide(DetectorSource::Honeypot, 50.0, DetectionMode::Balanced, 45.0)
            .unwrap();
        assert!((d.increase - 20.0).abs() < 1e-9);
        assert!((d.risk - 65.0).abs() < 1e-9);
        assert_eq!(d.tier, ActionTier::Redirect);
    }

    #[test]
    fn increase_is_deterministic() {
        let p = policy();
        let a = p.increase(DetectorSource::Ids, 33.0, DetectionMode::Strict).unwrap();
        let b = p.increase(DetectorSource::Ids, 33.0, DetectionMode::Strict).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
        assert!((a - 33.0 * 0.6 * 0.8).abs() < 1e-9);
    }

    #[test]
    fn tier_boundaries_are_inclusive() {
        let t = Thresholds::default();
        assert_eq!(t.tier_for(100.0), ActionTier::Block);
        assert_eq!(t.tier_for(99.999), ActionTier::Redirect);
        assert_eq!(t.tier_for(60.0), ActionTier::Redirect);
        assert_eq!(t.tier_for(59.9), ActionTier::RateLimit);
        assert_eq!(t.tier_for(40.0), ActionTier::RateLimit);
        assert_eq!(t.tier_for(20.0), ActionTier::IntermediateRedirect);
        assert_eq!(t.tier_for(19.99), ActionTier::NoAction);
        assert_eq!(t.tier_for(0.0), ActionTier::NoAction);
        assert_eq!(t.tier_for(1e12), ActionTier::Block);
    }

    #[test]
    fn rejects_bad_scores() {
        let p = policy();
        for score in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(
                p.increase(DetectorSource::Edr, score, DetectionMode::Loose).is_err(),
                "{score} should be rejected"
            );
        }
        assert_eq!(
            p.increase(DetectorSource::Edr, 0.0, DetectionMode::Loose).unwrap(),
            0.0
        );
    }

    #[test]
    fn thresholds_must_descend() {
        let mut t = Thresholds::default();
        t.rate_limit = 60.0;
        assert!(EscalationPolicy::new(t).is_err());

        let mut t = Thresholds::default();
        t.block = f64::INFINITY;
        assert!(t.validate().is_err());

        let custom = Thresholds {
            block: 10.0,
            redirect: 5.0,
            rate_limit: 2.0,
            intermediate_redirect: 1.0,
        };
        let p = EscalationPolicy::new(custom).unwrap();
        assert_eq!(p.thresholds().tier_for(6.0), ActionTier::Redirect);
    }
}
