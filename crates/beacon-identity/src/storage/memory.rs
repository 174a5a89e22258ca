//! MemoryStorage: process-local stand-in for the cross-tab storage hub.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use beacon_core::errors::{BeaconResult, StorageError};
use beacon_core::traits::CrossTabStorage;
use dashmap::DashMap;

/// Thread-safe key/value storage using `DashMap`.
///
/// Values survive as long as the `MemoryStorage` (or a clone) is alive, so
/// two tracker instances sharing one clone behave like two tabs sharing a hub.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    entries: Arc<DashMap<String, String>>,
    connected: Arc<AtomicBool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            connected: Arc::new(AtomicBool::new(true)),
        }
    }

    /// A storage whose hub never connects.
    pub fn disconnected() -> Self {
        let storage = Self::new();
        storage.set_connected(false);
        storage
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Read a value without going through the async interface.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn ensure_connected(&self) -> BeaconResult<()> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::NotConnected.into())
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CrossTabStorage for MemoryStorage {
    async fn on_connect(&self) -> BeaconResult<()> {
        self.ensure_connected()
    }

    async fn get(&self, key: &str) -> BeaconResult<Option<String>> {
        self.ensure_connected()?;
        Ok(self.peek(key))
    }

    async fn set(&self, key: &str, value: &str) -> BeaconResult<()> {
        self.ensure_connected()?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
