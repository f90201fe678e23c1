// ONOS REST wire types
//
// Request and response bodies for the `/onos/v1` endpoints this client
// touches. Listing responses use `#[serde(default)]` liberally because ONOS
// omits empty collections and optional annotations.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// EtherType for IPv4, as ONOS expects it in `ETH_TYPE` criteria.
pub const ETH_TYPE_IPV4: &str = "0x0800";

// ── Lenient scalar decoding ──────────────────────────────────────────

/// ONOS serializes ports and rule ids as strings in some builds and as
/// numbers in others. Accept both and keep the string form.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Str(String),
    Int(i64),
    Uint(u64),
    Float(f64),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::Str(s) => s,
            StringOrNumber::Int(n) => n.to_string(),
            StringOrNumber::Uint(n) => n.to_string(),
            StringOrNumber::Float(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    StringOrNumber::deserialize(de).map(String::from)
}

fn opt_string_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Option::<StringOrNumber>::deserialize(de).map(|v| v.map(String::from))
}

// ── Topology ─────────────────────────────────────────────────────────

/// `GET /devices` envelope.
#[derive(Debug, Deserialize)]
pub struct DevicesResponse {
    #[serde(default)]
    pub devices: Vec<Device>,
}

/// `GET /links` envelope.
#[derive(Debug, Deserialize)]
pub struct LinksResponse {
    #[serde(default)]
    pub links: Vec<Link>,
}

/// `GET /hosts` envelope.
#[derive(Debug, Deserialize)]
pub struct HostsResponse {
    #[serde(default)]
    pub hosts: Vec<Host>,
}

/// Infrastructure device (switch) as reported by the controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    #[serde(default, rename = "type")]
    pub device_type: Option<String>,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub mfr: Option<String>,
    #[serde(default)]
    pub hw: Option<String>,
    #[serde(default)]
    pub sw: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub driver: Option<String>,
    #[serde(default)]
    pub chassis_id: Option<String>,
    #[serde(default)]
    pub annotations: HashMap<String, serde_json::Value>,
}

/// A (device, port) pair. Used for link endpoints and intent ingress/egress.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectPoint {
    #[serde(deserialize_with = "string_or_number")]
    pub port: String,
    pub device: String,
}

impl ConnectPoint {
    pub fn new(device: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            device: device.into(),
        }
    }
}

/// Unidirectional infrastructure link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub src: ConnectPoint,
    pub dst: ConnectPoint,
    #[serde(default, rename = "type")]
    pub link_type: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    /// Free-form annotations; `latency` is the one routing cares about.
    #[serde(default)]
    pub annotations: HashMap<String, serde_json::Value>,
}

/// Where a host attaches to the fabric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostLocation {
    pub element_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub port: String,
}

/// End host learned by the controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    pub id: String,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub vlan: Option<String>,
    #[serde(default)]
    pub ip_addresses: Vec<String>,
    /// Ordered as the controller reports them; the first entry is treated
    /// as the primary attachment point.
    #[serde(default)]
    pub locations: Vec<HostLocation>,
}

/// Devices, links, and hosts fetched in one pass.
#[derive(Debug, Clone, Default)]
pub struct TopologySnapshot {
    pub devices: Vec<Device>,
    pub links: Vec<Link>,
    pub hosts: Vec<Host>,
}

// ── ACL ──────────────────────────────────────────────────────────────

/// ACL verdict. Only these two values are accepted by the controller.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AclAction {
    Allow,
    Deny,
}

/// Body for `POST /acl/rules`. Absent fields are not sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AclRuleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_mac: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst_mac: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eth_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_proto: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_tp_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst_tp_port: Option<u16>,
    pub action: AclAction,
}

/// `GET /acl/rules` envelope.
#[derive(Debug, Deserialize)]
pub struct AclRulesResponse {
    #[serde(default, rename = "aclRules")]
    pub acl_rules: Vec<AclRule>,
}

/// An installed ACL rule as listed by the controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AclRule {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub src_ip: Option<String>,
    #[serde(default)]
    pub dst_ip: Option<String>,
    #[serde(default)]
    pub action: Option<AclAction>,
    /// Catch-all for the remaining match fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Meters ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeterUnit {
    KbPerSec,
    PktsPerSec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BandType {
    Drop,
    Remark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterBand {
    #[serde(rename = "type")]
    pub band_type: BandType,
    pub rate: u64,
    pub burst_size: u64,
}

/// Body for `POST /meters/{deviceId}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterRequest {
    pub device_id: String,
    pub meter_id: String,
    pub unit: MeterUnit,
    pub bands: Vec<MeterBand>,
}

/// `GET /meters/{deviceId}` envelope.
#[derive(Debug, Deserialize)]
pub struct MetersResponse {
    #[serde(default)]
    pub meters: Vec<MeterEntry>,
}

/// An installed meter as listed by the controller.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterEntry {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub bands: Vec<MeterBandEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterBandEntry {
    #[serde(default)]
    pub rate: u64,
    #[serde(default)]
    pub burst_size: Option<u64>,
}

// ── Selectors & treatments ───────────────────────────────────────────

/// Match criterion inside a selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Criterion {
    EthType {
        #[serde(rename = "ethType")]
        eth_type: String,
    },
    Ipv4Src {
        ip: String,
    },
    Ipv4Dst {
        ip: String,
    },
    EthSrc {
        mac: String,
    },
    EthDst {
        mac: String,
    },
    VlanVid {
        #[serde(rename = "vlanId")]
        vlan_id: u16,
    },
}

impl Criterion {
    /// `ETH_TYPE = 0x0800`.
    pub fn ipv4() -> Self {
        Self::EthType {
            eth_type: ETH_TYPE_IPV4.to_owned(),
        }
    }
}

/// Treatment instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Instruction {
    #[serde(rename = "METER")]
    Meter {
        #[serde(rename = "meterId")]
        meter_id: String,
    },
    #[serde(rename = "OUTPUT")]
    Output { port: String },
    #[serde(rename = "L3MODIFICATION")]
    L3Modification { subtype: String, ip: String },
    #[serde(rename = "VLAN_PUSH")]
    VlanPush {
        #[serde(rename = "vlanId")]
        vlan_id: u16,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    pub criteria: Vec<Criterion>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Treatment {
    pub instructions: Vec<Instruction>,
}

// ── Flow rules ───────────────────────────────────────────────────────

/// Body for `POST /flows/{deviceId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowRule {
    pub priority: u32,
    pub timeout: u32,
    pub is_permanent: bool,
    pub device_id: String,
    pub treatment: Treatment,
    pub selector: Selector,
}

// ── Intents ──────────────────────────────────────────────────────────

/// Body for `POST /intents`, tagged by the ONOS intent type name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Intent {
    #[serde(rename = "PointToPointIntent")]
    PointToPoint(PointToPointIntent),
    #[serde(rename = "MultipointToSinglepointIntent")]
    MultipointToSinglepoint(MultipointToSinglepointIntent),
    #[serde(rename = "BroadcastIntent")]
    Broadcast(BroadcastIntent),
    #[serde(rename = "VlanIntent")]
    Vlan(VlanIntent),
}

impl Intent {
    /// ONOS type name, as it appears in the `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PointToPoint(_) => "PointToPointIntent",
            Self::MultipointToSinglepoint(_) => "MultipointToSinglepointIntent",
            Self::Broadcast(_) => "BroadcastIntent",
            Self::Vlan(_) => "VlanIntent",
        }
    }

    pub fn app_id(&self) -> &str {
        match self {
            Self::PointToPoint(i) => &i.app_id,
            Self::MultipointToSinglepoint(i) => &i.app_id,
            Self::Broadcast(i) => &i.app_id,
            Self::Vlan(i) => &i.app_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointToPointIntent {
    pub app_id: String,
    pub priority: u32,
    pub selector: Selector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment: Option<Treatment>,
    pub ingress_point: ConnectPoint,
    pub egress_point: ConnectPoint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipointToSinglepointIntent {
    pub app_id: String,
    pub priority: u32,
    pub ingress_points: Vec<ConnectPoint>,
    pub egress_point: ConnectPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<Selector>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastIntent {
    pub app_id: String,
    pub priority: u32,
    pub ingress_point: ConnectPoint,
    pub broadcast_group: Vec<ConnectPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VlanIntent {
    pub app_id: String,
    pub priority: u32,
    pub ingress_point: ConnectPoint,
    pub selector: Selector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment: Option<Treatment>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn acl_request_omits_absent_fields() {
        let rule = AclRuleRequest {
            src_ip: Some("10.0.0.1/32".into()),
            dst_ip: None,
            src_mac: None,
            dst_mac: None,
            vlan_id: None,
            eth_type: None,
            ip_proto: None,
            src_tp_port: None,
            dst_tp_port: Some(22),
            action: AclAction::Deny,
        };
        assert_eq!(
            serde_json::to_value(&rule).unwrap(),
            json!({ "srcIp": "10.0.0.1/32", "dstTpPort": 22, "action": "DENY" })
        );
    }

    #[test]
    fn acl_action_parses_only_allow_and_deny() {
        assert_eq!("ALLOW".parse::<AclAction>().unwrap(), AclAction::Allow);
        assert_eq!("DENY".parse::<AclAction>().unwrap(), AclAction::Deny);
        assert!("REJECT".parse::<AclAction>().is_err());
        assert!("deny".parse::<AclAction>().is_err());
    }

    #[test]
    fn installed_rule_accepts_numeric_id() {
        let rule: AclRule = serde_json::from_value(json!({ "id": 7, "srcIp": "10.0.0.1/32" })).unwrap();
        assert_eq!(rule.id.as_deref(), Some("7"));
        assert_eq!(rule.src_ip.as_deref(), Some("10.0.0.1/32"));
        assert!(rule.action.is_none());
    }

    #[test]
    fn host_location_accepts_numeric_port() {
        let host: Host = serde_json::from_value(json!({
            "id": "00:00:00:00:00:01/None",
            "mac": "00:00:00:00:00:01",
            "ipAddresses": ["10.0.0.1"],
            "locations": [{ "elementId": "of:0000000000000001", "port": 1 }]
        }))
        .unwrap();
        assert_eq!(host.locations[0].port, "1");
    }

    #[test]
    fn point_to_point_intent_wire_shape() {
        let intent = Intent::PointToPoint(PointToPointIntent {
            app_id: "org.onosproject.cli".into(),
            priority: 200,
            selector: Selector {
                criteria: vec![
                    Criterion::ipv4(),
                    Criterion::Ipv4Src {
                        ip: "10.0.0.1/32".into(),
                    },
                ],
            },
            treatment: None,
            ingress_point: ConnectPoint::new("of:0000000000000001", "1"),
            egress_point: ConnectPoint::new("of:0000000000000002", "3"),
        });

        assert_eq!(
            serde_json::to_value(&intent).unwrap(),
            json!({
                "type": "PointToPointIntent",
                "appId": "org.onosproject.cli",
                "priority": 200,
                "selector": { "criteria": [
                    { "type": "ETH_TYPE", "ethType": "0x0800" },
                    { "type": "IPV4_SRC", "ip": "10.0.0.1/32" }
                ]},
                "ingressPoint": { "port": "1", "device": "of:0000000000000001" },
                "egressPoint": { "port": "3", "device": "of:0000000000000002" }
            })
        );
    }

    #[test]
    fn flow_rule_wire_shape() {
        let flow = FlowRule {
            priority: 41000,
            timeout: 0,
            is_permanent: true,
            device_id: "of:0000000000000001".into(),
            treatment: Treatment {
                instructions: vec![
                    Instruction::Meter {
                        meter_id: "12".into(),
                    },
                    Instruction::Output { port: "2".into() },
                ],
            },
            selector: Selector {
                criteria: vec![
                    Criterion::ipv4(),
                    Criterion::EthDst {
                        mac: "00:00:00:00:00:01".into(),
                    },
                ],
            },
        };

        let value = serde_json::to_value(&flow).unwrap();
        assert_eq!(value["isPermanent"], json!(true));
        assert_eq!(
            value["treatment"]["instructions"][0],
            json!({ "type": "METER", "meterId": "12" })
        );
        assert_eq!(
            value["selector"]["criteria"][1],
            json!({ "type": "ETH_DST", "mac": "00:00:00:00:00:01" })
        );
    }

    #[test]
    fn meter_request_wire_shape() {
        let meter = MeterRequest {
            device_id: "of:0000000000000001".into(),
            meter_id: "1700000000".into(),
            unit: MeterUnit::KbPerSec,
            bands: vec![MeterBand {
                band_type: BandType::Drop,
                rate: 50,
                burst_size: 1000,
            }],
        };
        assert_eq!(
            serde_json::to_value(&meter).unwrap(),
            json!({
                "deviceId": "of:0000000000000001",
                "meterId": "1700000000",
                "unit": "KB_PER_SEC",
                "bands": [{ "type": "DROP", "rate": 50, "burstSize": 1000 }]
            })
        );
    }
}
