// ── Action synthesizer ──
//
// Turns countermeasure requests into validated control-plane objects and
// issues them through a `ControlPlane`. Every operation follows the same
// order: validate inputs, fetch and resolve topology if placement matters,
// append an audit record, then mutate the controller. Nothing is retried.

use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use netsecflow_api::types::{
    AclAction, AclRuleRequest, BandType, BroadcastIntent, ConnectPoint, Criterion, FlowRule,
    Instruction, Intent, MeterBand, MeterRequest, MeterUnit, MultipointToSinglepointIntent,
    PointToPointIntent, Selector, Treatment, VlanIntent,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::audit::AuditLog;
use crate::control::ControlPlane;
use crate::error::CoreError;
use crate::ip::{self, HOST_PREFIX};
use crate::model::{ActionKind, ActionRecord, Origin};
use crate::topology::TopologyGraph;

// ── Tunables ─────────────────────────────────────────────────────────

/// Knobs for the objects the synthesizer emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ResponseProfile {
    /// Meter band rate used by the automated rate-limit tier.
    pub rate_limit: u64,
    pub burst_size: u64,
    /// Device the intermediate-redirect tier steers traffic towards.
    pub intermediate_device: String,
    pub app_id: String,
    pub intent_priority: u32,
    pub flow_priority: u32,
    pub device_redirect_priority: u32,
}

impl Default for ResponseProfile {
    fn default() -> Self {
        Self {
            rate_limit: 50,
            burst_size: 1000,
            intermediate_device: "of:0000000000000003".into(),
            app_id: "org.onosproject.cli".into(),
            intent_priority: 200,
            flow_priority: 41000,
            device_redirect_priority: 40000,
        }
    }
}

// ── ACL match fields ─────────────────────────────────────────────────

/// Optional match fields for an ACL rule. Absent fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AclMatch {
    pub src_ip: Option<String>,
    pub dst_ip: Option<String>,
    pub src_mac: Option<String>,
    pub dst_mac: Option<String>,
    pub vlan_id: Option<u16>,
    pub eth_type: Option<String>,
    pub ip_proto: Option<String>,
    pub src_tp_port: Option<u16>,
    pub dst_tp_port: Option<u16>,
}

impl AclMatch {
    pub fn source(ip: impl Into<String>) -> Self {
        Self {
            src_ip: Some(ip.into()),
            ..Self::default()
        }
    }

    pub fn destination(ip: impl Into<String>) -> Self {
        Self {
            dst_ip: Some(ip.into()),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), CoreError> {
        for addr in [&self.src_ip, &self.dst_ip].into_iter().flatten() {
            ip::validate(addr)?;
        }
        Ok(())
    }

    fn into_request(self, action: AclAction) -> AclRuleRequest {
        AclRuleRequest {
            src_ip: self.src_ip,
            dst_ip: self.dst_ip,
            src_mac: self.src_mac,
            dst_mac: self.dst_mac,
            vlan_id: self.vlan_id,
            eth_type: self.eth_type,
            ip_proto: self.ip_proto,
            src_tp_port: self.src_tp_port,
            dst_tp_port: self.dst_tp_port,
            action,
        }
    }
}

fn describe(ip: Option<&String>) -> &str {
    ip.map_or("any", String::as_str)
}

// ── Meter ids ────────────────────────────────────────────────────────

/// Clock-derived meter ids that never repeat within a process, even when
/// two meters are requested in the same second.
#[derive(Debug, Default)]
pub struct MeterIdGenerator {
    last: AtomicU64,
}

impl MeterIdGenerator {
    pub fn next(&self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }
}

// ── Synthesizer ──────────────────────────────────────────────────────

pub struct ActionSynthesizer<C, A> {
    control: Arc<C>,
    audit: Arc<A>,
    profile: ResponseProfile,
    meter_ids: MeterIdGenerator,
}

impl<C: ControlPlane, A: AuditLog> ActionSynthesizer<C, A> {
    pub fn new(control: Arc<C>, audit: Arc<A>, profile: ResponseProfile) -> Self {
        Self {
            control,
            audit,
            profile,
            meter_ids: MeterIdGenerator::default(),
        }
    }

    pub fn profile(&self) -> &ResponseProfile {
        &self.profile
    }

    pub fn control(&self) -> &Arc<C> {
        &self.control
    }

    async fn record(
        &self,
        kind: ActionKind,
        reason: String,
        source_ip: Option<&str>,
        origin: Origin,
    ) -> Result<(), CoreError> {
        debug!(action = %kind, %origin, "recording action");
        self.audit
            .append(ActionRecord::new(kind, reason, source_ip.map(str::to_owned), origin))
            .await
    }

    async fn graph(&self) -> Result<TopologyGraph, CoreError> {
        Ok(TopologyGraph::from_snapshot(self.control.topology().await?))
    }

    // ── ACL ──────────────────────────────────────────────────────────

    /// Create an ACL rule from an action name (`ALLOW` or `DENY`). Not audited.
    pub async fn create_acl_rule(&self, fields: AclMatch, action: &str) -> Result<(), CoreError> {
        let action = AclAction::from_str(action)
            .map_err(|_| CoreError::validation(format!("invalid ACL action: {action:?}")))?;
        fields.validate()?;
        self.install_acl(fields, action).await
    }

    async fn install_acl(&self, fields: AclMatch, action: AclAction) -> Result<(), CoreError> {
        let rule = fields.into_request(action);
        match self.control.create_acl_rule(&rule).await {
            Ok(()) => {
                info!(
                    %action,
                    src_ip = ?rule.src_ip,
                    dst_ip = ?rule.dst_ip,
                    "ACL rule created"
                );
                Ok(())
            }
            Err(e) => {
                warn!(%action, error = %e, "ACL rule creation failed");
                Err(e)
            }
        }
    }

    /// Audit then install a DENY rule.
    pub async fn block(&self, fields: AclMatch, origin: Origin) -> Result<(), CoreError> {
        fields.validate()?;
        let reason = format!(
            "Blocked traffic for {} to {}.",
            describe(fields.src_ip.as_ref()),
            describe(fields.dst_ip.as_ref())
        );
        self.record(ActionKind::Block, reason, fields.src_ip.as_deref(), origin)
            .await?;
        self.install_acl(fields, AclAction::Deny).await
    }

    /// Audit then install an ALLOW rule.
    pub async fn allow(&self, fields: AclMatch, origin: Origin) -> Result<(), CoreError> {
        fields.validate()?;
        let reason = format!(
            "Allow traffic from {} to {}.",
            describe(fields.src_ip.as_ref()),
            describe(fields.dst_ip.as_ref())
        );
        self.record(ActionKind::Allow, reason, fields.src_ip.as_deref(), origin)
            .await?;
        self.install_acl(fields, AclAction::Allow).await
    }

    /// Delete every installed rule whose srcIp or dstIp equals a target.
    ///
    /// Targets without a prefix are matched as `/32`. Returns the deleted
    /// rule ids; stops at the first failed delete.
    pub async fn unblock(
        &self,
        src_ip: Option<&str>,
        dst_ip: Option<&str>,
        origin: Origin,
    ) -> Result<Vec<String>, CoreError> {
        if src_ip.is_none() && dst_ip.is_none() {
            return Err(CoreError::validation(
                "unblock needs a source or destination address",
            ));
        }
        let src = src_ip.map(|addr| ip::normalize_cidr(addr, HOST_PREFIX)).transpose()?;
        let dst = dst_ip.map(|addr| ip::normalize_cidr(addr, HOST_PREFIX)).transpose()?;

        let rules = self.control.list_acl_rules().await?;
        let matches_target = |installed: Option<&String>, target: Option<&String>| {
            matches!((installed, target), (Some(have), Some(want)) if have.trim() == want.as_str())
        };
        let targets: Vec<_> = rules
            .iter()
            .filter(|r| {
                matches_target(r.src_ip.as_ref(), src.as_ref())
                    || matches_target(r.dst_ip.as_ref(), dst.as_ref())
            })
            .collect();

        let identifier = src.as_deref().or(dst.as_deref()).unwrap_or_default();
        if targets.is_empty() {
            return Err(CoreError::NotFound {
                entity_type: "ACL rule".into(),
                identifier: identifier.to_owned(),
            });
        }

        let reason = format!(
            "Unblock traffic from {} to {}.",
            describe(src.as_ref()),
            describe(dst.as_ref())
        );
        self.record(ActionKind::Unblock, reason, src_ip.or(dst_ip), origin)
            .await?;

        let mut deleted = Vec::with_capacity(targets.len());
        for rule in targets {
            let Some(id) = rule.id.as_deref() else {
                warn!(target = identifier, "matching ACL rule has no id, skipping");
                continue;
            };
            self.control.delete_acl_rule(id).await?;
            info!(rule_id = id, target = identifier, "ACL rule deleted");
            deleted.push(id.to_owned());
        }

        if deleted.is_empty() {
            return Err(CoreError::NotFound {
                entity_type: "ACL rule".into(),
                identifier: identifier.to_owned(),
            });
        }
        Ok(deleted)
    }

    // ── Rate limiting ────────────────────────────────────────────────

    /// Meter a host's inbound traffic on its attachment port.
    ///
    /// The flow rule referencing the meter is only sent once the
    /// controller has confirmed the meter. Returns the confirmed meter id.
    pub async fn rate_limit_host(
        &self,
        host_ip: &str,
        rate: u64,
        origin: Origin,
    ) -> Result<String, CoreError> {
        ip::validate(host_ip)?;
        if rate == 0 {
            return Err(CoreError::validation("rate limit must be positive"));
        }

        let graph = self.graph().await?;
        let host = graph.resolve_host(host_ip)?;
        // The flow matches on ETH_DST, so the MAC is required here.
        let mac = host.mac.clone().ok_or_else(|| CoreError::HostMacUnknown {
            ip: host_ip.to_owned(),
        })?;

        self.record(
            ActionKind::RateLimit,
            format!("Rate limited {host_ip} ({mac}) to {rate} bps."),
            Some(host_ip),
            origin,
        )
        .await?;

        let meter = MeterRequest {
            device_id: host.device_id.clone(),
            meter_id: self.meter_ids.next().to_string(),
            unit: MeterUnit::KbPerSec,
            bands: vec![MeterBand {
                band_type: BandType::Drop,
                rate,
                burst_size: self.profile.burst_size,
            }],
        };
        let meter_id = match self.control.create_meter(&meter).await {
            Ok(id) => id,
            Err(e) => {
                warn!(source_ip = %host_ip, device_id = %host.device_id, error = %e, "meter creation failed");
                return Err(e);
            }
        };

        let flow = FlowRule {
            priority: self.profile.flow_priority,
            timeout: 0,
            is_permanent: true,
            device_id: host.device_id.clone(),
            treatment: Treatment {
                instructions: vec![
                    Instruction::Meter {
                        meter_id: meter_id.clone(),
                    },
                    Instruction::Output {
                        port: host.port.clone(),
                    },
                ],
            },
            selector: Selector {
                criteria: vec![Criterion::ipv4(), Criterion::EthDst { mac }],
            },
        };
        self.control.create_flow_rule(&flow).await?;

        info!(
            source_ip = %host_ip,
            device_id = %host.device_id,
            port = %host.port,
            %meter_id,
            "rate limit applied"
        );
        Ok(meter_id)
    }

    // ── Redirection ──────────────────────────────────────────────────

    /// Steer a source's traffic to the honeypot's attachment point.
    ///
    /// A shortest path is computed to confirm reachability and logged, but
    /// only the end points go into the intent; the controller picks hops.
    pub async fn redirect_full(
        &self,
        source_ip: &str,
        honeypot_ip: &str,
        origin: Origin,
    ) -> Result<Vec<String>, CoreError> {
        ip::validate(source_ip)?;
        ip::validate(honeypot_ip)?;

        let graph = self.graph().await?;
        let source = graph.resolve_host(source_ip)?;
        let honeypot = graph.resolve_host(honeypot_ip)?;

        let path = graph.shortest_path(&source.device_id, &honeypot.device_id);
        if path.is_empty() {
            return Err(CoreError::NoPath {
                from: source.device_id,
                to: honeypot.device_id,
            });
        }
        debug!(source_ip = %source_ip, path = ?path, "shortest path to honeypot");

        self.record(
            ActionKind::Redirect,
            format!("Redirected traffic from {source_ip} to {honeypot_ip}."),
            Some(source_ip),
            origin,
        )
        .await?;

        let intent = self.point_to_point_intent(
            source_ip,
            ConnectPoint::new(&source.device_id, &source.port),
            ConnectPoint::new(&honeypot.device_id, &honeypot.port),
        );
        self.control.submit_intent(&intent).await?;

        info!(source_ip = %source_ip, honeypot = %honeypot_ip, hops = path.len(), "redirected to honeypot");
        Ok(path)
    }

    /// Steer a source's traffic out of its switch towards a directly
    /// connected intermediate device.
    pub async fn redirect_to_intermediate(
        &self,
        source_ip: &str,
        device_id: &str,
        origin: Origin,
    ) -> Result<(), CoreError> {
        ip::validate(source_ip)?;

        let graph = self.graph().await?;
        let source = graph.resolve_host(source_ip)?;
        if graph.device(device_id).is_none() {
            return Err(CoreError::DeviceNotFound {
                identifier: device_id.to_owned(),
            });
        }
        let link = graph
            .direct_link(&source.device_id, device_id)
            .ok_or_else(|| CoreError::NoDirectLink {
                from: source.device_id.clone(),
                to: device_id.to_owned(),
            })?;
        let egress_port = link.src.port.clone();

        self.record(
            ActionKind::Redirect,
            format!("Redirected traffic from {source_ip} to intermediate switch {device_id}."),
            Some(source_ip),
            origin,
        )
        .await?;

        let intent = self.point_to_point_intent(
            source_ip,
            ConnectPoint::new(&source.device_id, &source.port),
            ConnectPoint::new(&source.device_id, &egress_port),
        );
        self.control.submit_intent(&intent).await?;

        info!(source_ip = %source_ip, device_id, egress_port = %egress_port, "redirected to intermediate device");
        Ok(())
    }

    /// Rewrite the destination of a source's traffic on one device.
    pub async fn redirect_on_device(
        &self,
        src_ip: &str,
        dest_ip: &str,
        ingress_port: &str,
        egress_port: &str,
        device_id: &str,
        origin: Origin,
    ) -> Result<(), CoreError> {
        ip::validate(src_ip)?;
        ip::validate(dest_ip)?;
        if ingress_port.is_empty() || egress_port.is_empty() {
            return Err(CoreError::validation(
                "ingress and egress ports must be specified",
            ));
        }
        let dest_addr = dest_ip.split('/').next().unwrap_or(dest_ip);

        self.record(
            ActionKind::Redirect,
            format!("Redirected traffic from {src_ip} to {dest_ip}."),
            Some(src_ip),
            origin,
        )
        .await?;

        let intent = Intent::PointToPoint(PointToPointIntent {
            app_id: self.profile.app_id.clone(),
            priority: self.profile.device_redirect_priority,
            selector: Selector {
                criteria: vec![
                    Criterion::ipv4(),
                    Criterion::Ipv4Src {
                        ip: src_ip.to_owned(),
                    },
                ],
            },
            treatment: Some(Treatment {
                instructions: vec![Instruction::L3Modification {
                    subtype: "IPV4_DST".into(),
                    ip: dest_addr.to_owned(),
                }],
            }),
            ingress_point: ConnectPoint::new(device_id, ingress_port),
            egress_point: ConnectPoint::new(device_id, egress_port),
        });
        self.control.submit_intent(&intent).await?;

        info!(src_ip, dest_ip = dest_addr, device_id, "destination rewrite installed");
        Ok(())
    }

    // ── Intent builders ──────────────────────────────────────────────

    /// IPv4 traffic from `source_ip/32` between two connect points.
    pub fn point_to_point_intent(
        &self,
        source_ip: &str,
        ingress: ConnectPoint,
        egress: ConnectPoint,
    ) -> Intent {
        Intent::PointToPoint(PointToPointIntent {
            app_id: self.profile.app_id.clone(),
            priority: self.profile.intent_priority,
            selector: Selector {
                criteria: vec![
                    Criterion::ipv4(),
                    Criterion::Ipv4Src {
                        ip: format!("{source_ip}/{HOST_PREFIX}"),
                    },
                ],
            },
            treatment: None,
            ingress_point: ingress,
            egress_point: egress,
        })
    }

    /// Funnel several ingress points into one egress. With both addresses
    /// given the intent only matches that host pair.
    pub fn multipoint_intent(
        &self,
        ingress: Vec<ConnectPoint>,
        egress: ConnectPoint,
        addresses: Option<(&str, &str)>,
    ) -> Result<Intent, CoreError> {
        if ingress.is_empty() {
            return Err(CoreError::validation(
                "multipoint intent needs at least one ingress point",
            ));
        }
        let selector = match addresses {
            Some((src, dst)) => {
                ip::validate(src)?;
                ip::validate(dst)?;
                Some(Selector {
                    criteria: vec![
                        Criterion::Ipv4Src {
                            ip: format!("{src}/{HOST_PREFIX}"),
                        },
                        Criterion::Ipv4Dst {
                            ip: format!("{dst}/{HOST_PREFIX}"),
                        },
                    ],
                })
            }
            None => None,
        };
        Ok(Intent::MultipointToSinglepoint(MultipointToSinglepointIntent {
            app_id: self.profile.app_id.clone(),
            priority: self.profile.intent_priority,
            ingress_points: ingress,
            egress_point: egress,
            selector,
        }))
    }

    pub fn broadcast_intent(
        &self,
        ingress: ConnectPoint,
        group: Vec<ConnectPoint>,
    ) -> Result<Intent, CoreError> {
        if group.is_empty() {
            return Err(CoreError::validation("broadcast group must not be empty"));
        }
        Ok(Intent::Broadcast(BroadcastIntent {
            app_id: self.profile.app_id.clone(),
            priority: self.profile.intent_priority,
            ingress_point: ingress,
            broadcast_group: group,
        }))
    }

    /// Match `vlan_id` at the ingress; optionally push `push_vlan`.
    pub fn vlan_intent(&self, ingress: ConnectPoint, vlan_id: u16, push_vlan: Option<u16>) -> Intent {
        Intent::Vlan(VlanIntent {
            app_id: self.profile.app_id.clone(),
            priority: self.profile.intent_priority,
            ingress_point: ingress,
            selector: Selector {
                criteria: vec![Criterion::VlanVid { vlan_id }],
            },
            treatment: push_vlan.map(|vlan_id| Treatment {
                instructions: vec![Instruction::VlanPush { vlan_id }],
            }),
        })
    }

    /// Submit an already-built intent.
    pub async fn submit_intent(&self, intent: &Intent) -> Result<(), CoreError> {
        self.control.submit_intent(intent).await?;
        info!(kind = intent.kind(), app_id = intent.app_id(), "intent submitted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meter_ids_strictly_increase() {
        let ids = MeterIdGenerator::default();
        let a = ids.next();
        let b = ids.next();
        let c = ids.next();
        assert!(a < b && b < c);
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
        assert!(a + 1 >= now);
    }

    #[test]
    fn acl_match_validation() {
        assert!(AclMatch::source("10.0.0.1/32").validate().is_ok());
        assert!(AclMatch::destination("10.0.0.999").validate().is_err());
        assert!(AclMatch::default().validate().is_ok());
    }

    #[test]
    fn acl_match_becomes_request() {
        let req = AclMatch {
            dst_tp_port: Some(443),
            ..AclMatch::source("10.0.0.1/32")
        }
        .into_request(AclAction::Deny);
        assert_eq!(req.src_ip.as_deref(), Some("10.0.0.1/32"));
        assert_eq!(req.dst_tp_port, Some(443));
        assert!(req.dst_ip.is_none());
        assert_eq!(req.action, AclAction::Deny);
    }
}
