//! 永続ストレージアダプター
//!
//! バックエンド（[`KeyValueStore`]）の失敗を呼び出し元へ伝播させず、
//! 読み出しは「値なし」、書き込みは何もしなかったものとして扱います。

pub mod json_file_store;
pub mod memory_store;

pub use json_file_store::JsonFileStore;
pub use memory_store::MemoryStore;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::application::traits::{KeyValueStore, StorageChange};

/// ストア障害を吸収するアダプター
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn KeyValueStore>,
}

impl Storage {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// 値を取得。失敗時は `None`
    pub async fn get(&self, key: &str) -> Option<Value> {
        match self.backend.get(key).await {
            Ok(value) => value,
            Err(e) => {
                eprintln!("storage read failed (key={key}): {e}");
                None
            }
        }
    }

    /// 値を書き込む。失敗はログのみ
    pub async fn set(&self, key: &str, value: Value) {
        if let Err(e) = self.backend.set(key, value).await {
            eprintln!("storage write failed (key={key}): {e}");
        }
    }

    /// シリアライズ可能な値を書き込む
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(value) => self.set(key, value).await,
            Err(e) => eprintln!("storage serialize failed (key={key}): {e}"),
        }
    }

    /// キーを削除。失敗はログのみ
    pub async fn remove(&self, key: &str) {
        if let Err(e) = self.backend.remove(key).await {
            eprintln!("storage remove failed (key={key}): {e}");
        }
    }

    /// 指定キーの変更を監視
    pub fn watch(&self, key: impl Into<String>) -> KeyWatcher {
        KeyWatcher {
            key: key.into(),
            rx: self.backend.subscribe(),
        }
    }

    /// 指定キーが変更されるたびにコールバックを非同期に呼び出すタスクを起動
    pub fn on_change<F>(&self, key: impl Into<String>, mut callback: F) -> JoinHandle<()>
    where
        F: FnMut(StorageChange) + Send + 'static,
    {
        let mut watcher = self.watch(key);
        tokio::spawn(async move {
            while let Some(change) = watcher.next().await {
                callback(change);
            }
        })
    }
}

/// 1 キー分の変更通知ストリーム
pub struct KeyWatcher {
    key: String,
    rx: broadcast::Receiver<StorageChange>,
}

impl KeyWatcher {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// 次の変更を待つ。ストアが破棄されたら `None`
    pub async fn next(&mut self) -> Option<StorageChange> {
        loop {
            match self.rx.recv().await {
                Ok(change) if change.key == self.key => return Some(change),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    eprintln!("storage watcher lagged (key={}, skipped={skipped})", self.key);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
