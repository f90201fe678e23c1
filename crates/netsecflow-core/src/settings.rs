// ── Settings collaborator ──
//
// Key/value store shared with the operator surface. Values are strings;
// interpretation (floats for risk marks, mode names, addresses) is up to
// the reader.

use std::future::Future;

use dashmap::DashMap;

use crate::error::CoreError;

/// Detection mode key.
pub const MODE_KEY: &str = "Mode";
/// Honeypot address key.
pub const HONEYPOT_KEY: &str = "Honeypot IP Address";
/// Controller address override key.
pub const CONTROLLER_IP_KEY: &str = "SDN Controller IP";

/// Risk mark key for a source address.
pub fn marks_key(ip: &str) -> String {
    format!("{ip} marks")
}

/// Upsert-style string store.
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, CoreError>> + Send;

    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// In-process store backed by a `DashMap`.
#[derive(Debug, Default)]
pub struct MemorySettings {
    entries: DashMap<String, String>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from `(key, value)` pairs.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        for (k, v) in entries {
            store.entries.insert(k.into(), v.into());
        }
        store
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SettingsStore for MemorySettings {
    async fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
