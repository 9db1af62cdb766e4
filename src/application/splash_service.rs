//! 起動スプラッシュ表示の判定
//!
//! 最後に UI を開いた時刻を共有ストレージに記録し、初回または
//! 一定時間以上経過していればスプラッシュを表示する。

use std::time::Duration;

use serde_json::Value;

use crate::infrastructure::storage::Storage;
use crate::utils::clock::now_ms;

#[derive(Clone)]
pub struct SplashTracker {
    storage: Storage,
    key: String,
    interval: Duration,
}

impl SplashTracker {
    pub fn new(storage: Storage, key: impl Into<String>, interval: Duration) -> Self {
        Self {
            storage,
            key: key.into(),
            interval,
        }
    }

    pub async fn should_show(&self) -> bool {
        self.should_show_at(now_ms()).await
    }

    pub async fn should_show_at(&self, now: i64) -> bool {
        // 0 や数値以外は未記録扱い
        let last_opened = self
            .storage
            .get(&self.key)
            .await
            .as_ref()
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite() && *v != 0.0);

        match last_opened {
            Some(last) => (now as f64 - last) > self.interval.as_millis() as f64,
            None => true,
        }
    }

    /// 現在時刻を最終表示時刻として記録
    pub async fn record_open(&self) {
        self.record_open_at(now_ms()).await;
    }

    pub async fn record_open_at(&self, now: i64) {
        self.storage.set(&self.key, Value::from(now)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn tracker() -> (SplashTracker, Storage) {
        let storage = Storage::new(Arc::new(MemoryStore::new()));
        (
            SplashTracker::new(storage.clone(), "luno_last_opened", Duration::from_secs(60)),
            storage,
        )
    }

    #[tokio::test]
    async fn shows_on_first_open() {
        let (splash, _) = tracker();
        assert!(splash.should_show_at(1_000).await);
    }

    /// 60 秒以内の再表示ではスプラッシュを出さない
    #[tokio::test]
    async fn hides_within_interval() {
        let (splash, _) = tracker();
        splash.record_open_at(100_000).await;

        assert!(!splash.should_show_at(130_000).await);
        assert!(!splash.should_show_at(160_000).await);
        assert!(splash.should_show_at(160_001).await);
    }

    #[tokio::test]
    async fn non_numeric_timestamp_counts_as_absent() {
        let (splash, storage) = tracker();
        storage.set("luno_last_opened", json!("yesterday")).await;
        assert!(splash.should_show_at(1).await);
    }
}
