// ACL endpoints
//
// The ACL application only answers 201 on create and 204 on delete; any
// other status is surfaced as `Error::UnexpectedStatus`.

use tracing::debug;

use crate::error::Error;
use crate::onos::client::OnosClient;
use crate::onos::types::{AclRule, AclRuleRequest, AclRulesResponse};

impl OnosClient {
    /// Install an ACL rule.
    ///
    /// `POST /acl/rules` (expects 201)
    pub async fn create_acl_rule(&self, rule: &AclRuleRequest) -> Result<(), Error> {
        debug!(action = %rule.action, src_ip = ?rule.src_ip, dst_ip = ?rule.dst_ip, "creating ACL rule");
        self.post_created(self.endpoint(&["acl", "rules"]), rule)
            .await
            .map(|_| ())
    }

    /// List every installed ACL rule.
    ///
    /// `GET /acl/rules`
    pub async fn list_acl_rules(&self) -> Result<Vec<AclRule>, Error> {
        let resp: AclRulesResponse = self.get(self.endpoint(&["acl", "rules"])).await?;
        Ok(resp.acl_rules)
    }

    /// Remove one ACL rule by id.
    ///
    /// `DELETE /acl/rules/{id}` (expects 204)
    pub async fn delete_acl_rule(&self, rule_id: &str) -> Result<(), Error> {
        debug!(rule_id, "deleting ACL rule");
        self.delete_no_content(self.endpoint(&["acl", "rules", rule_id]))
            .await
    }
}
