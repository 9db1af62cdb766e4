//! 検索履歴を管理するサービス
//!
//! # 責任
//! - 共有ストレージ上の履歴リストの読み出しと正規化
//! - 検索成功時の追加（重複排除・最近使った順・件数上限）
//! - 削除と全消去
//!
//! 読み込み→変更→書き込みはロックなしで行うため、別コンテキストから同時に
//! 更新されると後から書いた側が勝つ（片方の更新は失われる）。

use crate::domain::HistoryEntry;
use crate::domain::history::{record_lookup, sanitize_history, without_word};
use crate::infrastructure::storage::Storage;
use crate::utils::clock::now_ms;

#[derive(Clone)]
pub struct HistoryManager {
    storage: Storage,
    key: String,
    limit: usize,
}

impl HistoryManager {
    pub fn new(storage: Storage, key: impl Into<String>, limit: usize) -> Self {
        Self {
            storage,
            key: key.into(),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// 正規化済みの履歴を返す。キーが無い場合は空リスト
    pub async fn list(&self) -> Vec<HistoryEntry> {
        match self.storage.get(&self.key).await {
            Some(raw) => sanitize_history(&raw, self.limit, now_ms()),
            None => Vec::new(),
        }
    }

    /// 単語を履歴の先頭に追加し、新しい履歴を返す
    pub async fn add(&self, word: &str) -> Vec<HistoryEntry> {
        if word.trim().is_empty() {
            return self.list().await;
        }

        let current = self.list().await;
        let updated = record_lookup(&current, word, now_ms(), self.limit);
        self.storage.set_json(&self.key, &updated).await;
        updated
    }

    /// 単語を履歴から取り除き、新しい履歴を返す
    pub async fn remove(&self, word: &str) -> Vec<HistoryEntry> {
        let current = self.list().await;
        if word.trim().is_empty() {
            return current;
        }

        let filtered = without_word(&current, word);
        if filtered.len() != current.len() {
            self.storage.set_json(&self.key, &filtered).await;
        }
        filtered
    }

    /// キーごと削除する（空配列の書き込みではない）
    pub async fn clear(&self) {
        self.storage.remove(&self.key).await;
    }
}
