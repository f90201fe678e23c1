// ── Risk ledger ──
//
// Per-source accumulated risk, persisted through the settings collaborator
// as a decimal string under "{ip} marks". Read-then-write updates for one
// key are serialized by a per-key async mutex held across both steps;
// different keys proceed independently.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::CoreError;
use crate::settings::{SettingsStore, marks_key};

pub struct RiskLedger<S> {
    settings: Arc<S>,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl<S: SettingsStore> RiskLedger<S> {
    pub fn new(settings: Arc<S>) -> Self {
        Self {
            settings,
            locks: DashMap::new(),
        }
    }

    pub fn settings(&self) -> &Arc<S> {
        &self.settings
    }

    fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(key.to_owned())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }

    /// Drop a key's lock once no caller holds or waits on it, so the lock
    /// table only tracks sources with work in flight.
    fn release(&self, key: &str, lock: Arc<Mutex<()>>) {
        drop(lock);
        self.locks.remove_if(key, |_, l| Arc::strong_count(l) == 1);
    }

    /// Current risk; an unseen source is initialized to 0.0 in storage.
    pub async fn get(&self, ip: &str) -> Result<f64, CoreError> {
        let key = marks_key(ip);
        let lock = self.lock_for(&key);
        let result = {
            let _guard = lock.lock().await;
            self.read_or_init(&key).await
        };
        self.release(&key, lock);
        result
    }

    /// Add `delta` and return the new total. Atomic per source.
    pub async fn update(&self, ip: &str, delta: f64) -> Result<f64, CoreError> {
        let key = marks_key(ip);
        let lock = self.lock_for(&key);
        let result = {
            let _guard = lock.lock().await;
            self.add(&key, delta).await
        };
        self.release(&key, lock);

        let updated = result?;
        debug!(source_ip = %ip, delta, updated, "risk updated");
        Ok(updated)
    }

    /// Reset a source to 0.0.
    pub async fn clear(&self, ip: &str) -> Result<(), CoreError> {
        let key = marks_key(ip);
        let lock = self.lock_for(&key);
        let result = {
            let _guard = lock.lock().await;
            self.settings.set(&key, "0.0").await
        };
        self.release(&key, lock);
        result
    }

    async fn add(&self, key: &str, delta: f64) -> Result<f64, CoreError> {
        let updated = self.read_or_init(key).await? + delta;
        self.settings.set(key, &updated.to_string()).await?;
        Ok(updated)
    }

    /// A missing or blank value counts as unseen.
    async fn read_or_init(&self, key: &str) -> Result<f64, CoreError> {
        match self.settings.get(key).await?.filter(|raw| !raw.trim().is_empty()) {
            Some(raw) => raw.trim().parse::<f64>().map_err(|e| CoreError::Storage {
                message: format!("stored value for {key:?} is not a number ({raw:?}): {e}"),
            }),
            None => {
                self.settings.set(key, "0.0").await?;
                Ok(0.0)
            }
        }
    }
}
