// Shared fixtures: a recording controller stub that doubles as the audit
// log, so tests can assert the relative order of audit and mutation.
#![allow(dead_code, clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use netsecflow_api::types::{
    AclRule, AclRuleRequest, FlowRule, Intent, MeterRequest, TopologySnapshot,
};
use netsecflow_core::{
    ActionRecord, ActionSynthesizer, AuditLog, ControlPlane, CoreError, ResponseProfile,
};
use serde_json::json;

pub const SWITCH_1: &str = "of:0000000000000001";
pub const SWITCH_2: &str = "of:0000000000000002";
pub const SWITCH_3: &str = "of:0000000000000003";
pub const ATTACKER: &str = "10.0.0.1";
pub const BYSTANDER: &str = "10.0.0.2";
pub const HONEYPOT: &str = "10.0.0.100";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Audit(ActionRecord),
    Topology,
    CreateAcl(AclRuleRequest),
    ListAcl,
    DeleteAcl(String),
    CreateMeter(MeterRequest),
    CreateFlow(FlowRule),
    SubmitIntent(Intent),
}

impl Call {
    /// Calls that change controller state.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::CreateAcl(_)
                | Self::DeleteAcl(_)
                | Self::CreateMeter(_)
                | Self::CreateFlow(_)
                | Self::SubmitIntent(_)
        )
    }
}

#[derive(Default)]
pub struct Recorder {
    pub snapshot: TopologySnapshot,
    pub acl_rules: Vec<AclRule>,
    pub fail_meter: bool,
    pub fail_intents: bool,
    pub fail_deletes: bool,
    calls: Mutex<Vec<Call>>,
}

fn rejected(what: &str) -> CoreError {
    CoreError::Api {
        message: format!("{what} rejected by stub"),
        status: Some(500),
    }
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            snapshot: lab_topology(),
            acl_rules: installed_rules(),
            ..Self::default()
        }
    }

    pub fn failing_meter() -> Self {
        Self {
            fail_meter: true,
            ..Self::new()
        }
    }

    pub fn failing_deletes() -> Self {
        Self {
            fail_deletes: true,
            ..Self::new()
        }
    }

    pub fn failing_intents() -> Self {
        Self {
            fail_intents: true,
            ..Self::new()
        }
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn audits(&self) -> Vec<ActionRecord> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Audit(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn intents(&self) -> Vec<Intent> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SubmitIntent(i) => Some(i),
                _ => None,
            })
            .collect()
    }

    /// Index of the first audit record and of the first mutation.
    pub fn audit_then_mutation(&self) -> (Option<usize>, Option<usize>) {
        let calls = self.calls();
        (
            calls.iter().position(|c| matches!(c, Call::Audit(_))),
            calls.iter().position(Call::is_mutation),
        )
    }
}

impl ControlPlane for Recorder {
    async fn topology(&self) -> Result<TopologySnapshot, CoreError> {
        self.push(Call::Topology);
        Ok(self.snapshot.clone())
    }

    async fn create_acl_rule(&self, rule: &AclRuleRequest) -> Result<(), CoreError> {
        self.push(Call::CreateAcl(rule.clone()));
        Ok(())
    }

    async fn list_acl_rules(&self) -> Result<Vec<AclRule>, CoreError> {
        self.push(Call::ListAcl);
        Ok(self.acl_rules.clone())
    }

    async fn delete_acl_rule(&self, rule_id: &str) -> Result<(), CoreError> {
        self.push(Call::DeleteAcl(rule_id.to_owned()));
        if self.fail_deletes {
            return Err(rejected("delete"));
        }
        Ok(())
    }

    async fn create_meter(&self, meter: &MeterRequest) -> Result<String, CoreError> {
        self.push(Call::CreateMeter(meter.clone()));
        if self.fail_meter {
            return Err(rejected("meter"));
        }
        Ok("7".into())
    }

    async fn create_flow_rule(&self, flow: &FlowRule) -> Result<(), CoreError> {
        self.push(Call::CreateFlow(flow.clone()));
        Ok(())
    }

    async fn submit_intent(&self, intent: &Intent) -> Result<(), CoreError> {
        self.push(Call::SubmitIntent(intent.clone()));
        if self.fail_intents {
            return Err(rejected("intent"));
        }
        Ok(())
    }
}

impl AuditLog for Recorder {
    async fn append(&self, record: ActionRecord) -> Result<(), CoreError> {
        self.push(Call::Audit(record));
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ActionRecord>, CoreError> {
        let mut records = self.audits();
        records.reverse();
        Ok(records)
    }
}

pub fn synthesizer(recorder: Recorder) -> (Arc<Recorder>, ActionSynthesizer<Recorder, Recorder>) {
    let recorder = Arc::new(recorder);
    let synth = ActionSynthesizer::new(
        Arc::clone(&recorder),
        Arc::clone(&recorder),
        ResponseProfile::default(),
    );
    (recorder, synth)
}

/// Three switches: 1<->2 both ways, 1->3 and 3->1. Attacker and bystander
/// hang off 1 and 2, the honeypot off 2.
pub fn lab_topology() -> TopologySnapshot {
    let devices = serde_json::from_value(json!([
        { "id": SWITCH_1, "type": "SWITCH", "available": true },
        { "id": SWITCH_2, "type": "SWITCH", "available": true },
        { "id": SWITCH_3, "type": "SWITCH", "available": true }
    ]))
    .unwrap();

    let links = serde_json::from_value(json!([
        { "src": { "device": SWITCH_1, "port": "2" }, "dst": { "device": SWITCH_2, "port": "2" },
          "annotations": { "latency": "1" } },
        { "src": { "device": SWITCH_2, "port": "2" }, "dst": { "device": SWITCH_1, "port": "2" },
          "annotations": { "latency": "1" } },
        { "src": { "device": SWITCH_1, "port": "3" }, "dst": { "device": SWITCH_3, "port": "1" } },
        { "src": { "device": SWITCH_3, "port": "1" }, "dst": { "device": SWITCH_1, "port": "3" } }
    ]))
    .unwrap();

    let hosts = serde_json::from_value(json!([
        { "id": "00:00:00:00:00:01/None", "mac": "00:00:00:00:00:01",
          "ipAddresses": [ATTACKER], "locations": [{ "elementId": SWITCH_1, "port": "1" }] },
        { "id": "00:00:00:00:00:02/None", "mac": "00:00:00:00:00:02",
          "ipAddresses": [BYSTANDER], "locations": [{ "elementId": SWITCH_2, "port": "3" }] },
        { "id": "00:00:00:00:00:64/None", "mac": "00:00:00:00:00:64",
          "ipAddresses": [HONEYPOT], "locations": [{ "elementId": SWITCH_2, "port": "1" }] }
    ]))
    .unwrap();

    TopologySnapshot {
        devices,
        links,
        hosts,
    }
}

pub fn installed_rules() -> Vec<AclRule> {
    serde_json::from_value(json!([
        { "id": "1", "srcIp": "10.0.0.1/32", "action": "DENY" },
        { "id": "2", "srcIp": "10.0.0.2/32", "action": "DENY" },
        { "id": 3, "dstIp": "10.0.0.5/32", "action": "DENY" }
    ]))
    .unwrap()
}
