//! ユーザー設定を管理するサービス
//!
//! 1 フィールドずつ読み込み→正規化→変更→書き込みを行う。
//! 同時更新時は後から書いた側が勝つ。

use crate::domain::{SettingUpdate, SettingsState, normalize_settings};
use crate::infrastructure::storage::Storage;

#[derive(Clone)]
pub struct SettingsManager {
    storage: Storage,
    key: String,
    defaults: SettingsState,
}

impl SettingsManager {
    pub fn new(storage: Storage, key: impl Into<String>, defaults: SettingsState) -> Self {
        Self {
            storage,
            key: key.into(),
            defaults,
        }
    }

    /// 常に全フィールドが埋まった設定を返す
    pub async fn get(&self) -> SettingsState {
        match self.storage.get(&self.key).await {
            Some(raw) => normalize_settings(&raw, &self.defaults),
            None => self.defaults.clone(),
        }
    }

    /// 1 フィールドを更新し、更新後の設定を返す
    pub async fn update(&self, update: SettingUpdate) -> SettingsState {
        let mut settings = self.get().await;
        update.apply(&mut settings);
        self.storage.set_json(&self.key, &settings).await;
        settings
    }
}
