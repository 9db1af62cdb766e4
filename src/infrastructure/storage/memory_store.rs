//! インメモリ版 KeyValueStore 実装（テスト・一時利用向け）
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::application::traits::{KeyValueStore, StorageChange};
use crate::error::{LunoError, Result};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
    available: AtomicBool,
    changes: broadcast::Sender<StorageChange>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            values: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
            changes,
        }
    }

    /// `false` にすると全操作が `StorageUnavailable` で失敗する
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(LunoError::StorageUnavailable("memory store disabled".into()))
        }
    }

    fn values(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Value>>> {
        self.values
            .lock()
            .map_err(|e| LunoError::StorageUnavailable(format!("memory store poisoned: {e}")))
    }

    fn notify(&self, key: &str, old_value: Option<Value>, new_value: Option<Value>) {
        // 購読者がいない場合の送信失敗は無視
        let _ = self.changes.send(StorageChange {
            key: key.to_string(),
            old_value,
            new_value,
        });
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        self.ensure_available()?;
        Ok(self.values()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.ensure_available()?;
        let old = self.values()?.insert(key.to_string(), value.clone());
        self.notify(key, old, Some(value));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.ensure_available()?;
        if let Some(old) = self.values()?.remove(key) {
            self.notify(key, Some(old), None);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }
}
