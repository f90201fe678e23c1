// ── Audit collaborator ──
//
// Append-only action log. Records are written before the controller is
// touched, so a record means "attempted", not "succeeded".

use std::future::Future;

use tokio::sync::RwLock;

use crate::error::CoreError;
use crate::model::ActionRecord;

pub trait AuditLog: Send + Sync {
    fn append(&self, record: ActionRecord) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// All records, most recent first.
    fn list(&self) -> impl Future<Output = Result<Vec<ActionRecord>, CoreError>> + Send;
}

#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    records: RwLock<Vec<ActionRecord>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditLog for MemoryAuditLog {
    async fn append(&self, record: ActionRecord) -> Result<(), CoreError> {
        self.records.write().await.push(record);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ActionRecord>, CoreError> {
        Ok(self.records.read().await.iter().rev().cloned().collect())
    }
}
