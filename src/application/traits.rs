//! Application層の抽象化トレイト定義
//! 外部依存を抽象化し、テスト可能な構造を提供します

use crate::domain::NormalizedDefinition;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

/// ストレージ上のキー変更通知
#[derive(Debug, Clone, PartialEq)]
pub struct StorageChange {
    pub key: String,
    pub old_value: Option<Value>,
    /// `None` はキー削除
    pub new_value: Option<Value>,
}

/// 非同期キーバリューストアの抽象化
///
/// キー単位の書き込みはそれぞれアトミックだが、複数キーをまとめて
/// コミットする手段はない。
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    async fn set(&self, key: &str, value: Value) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;

    /// 全キーの変更通知を購読
    fn subscribe(&self) -> broadcast::Receiver<StorageChange>;
}

/// 単語検索クライアントの抽象化
#[async_trait]
pub trait DefinitionClient: Send + Sync {
    /// 単語の定義を取得
    ///
    /// 失敗時は `InvalidWord` / `NotFound` / `Timeout` / `TransportFailure` のいずれか
    async fn lookup(&self, word: &str) -> Result<NormalizedDefinition>;
}

/// UI（ポップアップ）表示の抽象化
#[async_trait]
pub trait PopupOpener: Send + Sync {
    /// ポップアップの表示を試みる（ベストエフォート）
    async fn open(&self) -> Result<()>;
}
