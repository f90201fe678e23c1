// ── Control-plane seam ──
//
// The synthesizer talks to the controller only through this trait. The
// production implementation is `OnosClient`; tests substitute a recording
// stub.

use std::future::Future;

use netsecflow_api::OnosClient;
use netsecflow_api::types::{AclRule, AclRuleRequest, FlowRule, Intent, MeterRequest, TopologySnapshot};

use crate::error::CoreError;

pub trait ControlPlane: Send + Sync {
    fn topology(&self) -> impl Future<Output = Result<TopologySnapshot, CoreError>> + Send;

    fn create_acl_rule(
        &self,
        rule: &AclRuleRequest,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn list_acl_rules(&self) -> impl Future<Output = Result<Vec<AclRule>, CoreError>> + Send;

    fn delete_acl_rule(&self, rule_id: &str) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Create a meter and return the id the controller assigned, once confirmed.
    fn create_meter(
        &self,
        meter: &MeterRequest,
    ) -> impl Future<Output = Result<String, CoreError>> + Send;

    fn create_flow_rule(&self, flow: &FlowRule)
    -> impl Future<Output = Result<(), CoreError>> + Send;

    fn submit_intent(&self, intent: &Intent) -> impl Future<Output = Result<(), CoreError>> + Send;
}

impl ControlPlane for OnosClient {
    async fn topology(&self) -> Result<TopologySnapshot, CoreError> {
        Ok(OnosClient::topology(self).await?)
    }

    async fn create_acl_rule(&self, rule: &AclRuleRequest) -> Result<(), CoreError> {
        Ok(OnosClient::create_acl_rule(self, rule).await?)
    }

    async fn list_acl_rules(&self) -> Result<Vec<AclRule>, CoreError> {
        Ok(OnosClient::list_acl_rules(self).await?)
    }

    async fn delete_acl_rule(&self, rule_id: &str) -> Result<(), CoreError> {
        Ok(OnosClient::delete_acl_rule(self, rule_id).await?)
    }

    async fn create_meter(&self, meter: &MeterRequest) -> Result<String, CoreError> {
        Ok(OnosClient::create_meter(self, meter).await?)
    }

    async fn create_flow_rule(&self, flow: &FlowRule) -> Result<(), CoreError> {
        Ok(OnosClient::create_flow_rule(self, flow).await?)
    }

    async fn submit_intent(&self, intent: &Intent) -> Result<(), CoreError> {
        Ok(OnosClient::submit_intent(self, intent).await?)
    }
}
