//! サービスコンテナ
//!
//! # 責任
//! - 全ての依存関係の構築と管理
//! - キー名や上限値などの設定値を各サービスへ明示的に渡す
//! - テスト時のモック注入サポート

use std::sync::Arc;
use std::time::Duration;

use crate::application::traits::{DefinitionClient, KeyValueStore, PopupOpener};
use crate::application::{
    CommandHandler, HistoryManager, LookupOrchestrator, SettingsManager, SplashTracker,
};
use crate::domain::SettingsState;
use crate::domain::history::DEFAULT_HISTORY_LIMIT;
use crate::error::Result;
use crate::infrastructure::{
    config::app_config_from_env, external::DictionaryApiClient, popup::CommandPopupOpener,
    storage::JsonFileStore, storage::Storage,
};

pub const DEFAULT_API_BASE_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";

/// 共有ストレージ上のキー名
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageKeys {
    /// リクエスト状態（UI 同期用）
    pub request_state: String,
    pub history: String,
    pub settings: String,
    /// スプラッシュ判定用の最終表示時刻
    pub last_opened: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            request_state: "currentDefinition".into(),
            history: "luno_history".into(),
            settings: "luno_settings".into(),
            last_opened: "luno_last_opened".into(),
        }
    }
}

/// アプリケーション設定
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub keys: StorageKeys,
    pub history_limit: usize,
    /// 検索タイムアウト
    pub lookup_timeout: Duration,
    /// スプラッシュを再表示するまでの間隔
    pub splash_interval: Duration,
    pub api_base_url: String,
    pub default_settings: SettingsState,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            keys: StorageKeys::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            lookup_timeout: Duration::from_secs(10),
            splash_interval: Duration::from_secs(60),
            api_base_url: DEFAULT_API_BASE_URL.into(),
            default_settings: SettingsState::default(),
        }
    }
}

/// サービスコンテナ
pub struct ServiceContainer {
    pub config: AppConfig,
    pub storage: Storage,
    pub history: HistoryManager,
    pub settings: SettingsManager,
    pub splash: SplashTracker,
    pub orchestrator: Arc<LookupOrchestrator>,
    pub command_handler: CommandHandler,
}

impl ServiceContainer {
    /// 環境変数の設定とファイルストアで作成
    pub fn new() -> Result<Self> {
        let config = app_config_from_env();
        let store = Arc::new(JsonFileStore::open_default()?);
        let client = Arc::new(DictionaryApiClient::new(
            &config.api_base_url,
            config.lookup_timeout,
        )?);
        let popup = CommandPopupOpener::from_env().map(|p| Arc::new(p) as Arc<dyn PopupOpener>);

        Ok(Self::with_dependencies(config, store, client, popup))
    }

    /// 依存関係を注入して作成（テスト用）
    pub fn with_dependencies(
        config: AppConfig,
        store: Arc<dyn KeyValueStore>,
        client: Arc<dyn DefinitionClient>,
        popup: Option<Arc<dyn PopupOpener>>,
    ) -> Self {
        let storage = Storage::new(store);
        let history = HistoryManager::new(
            storage.clone(),
            config.keys.history.clone(),
            config.history_limit,
        );
        let settings = SettingsManager::new(
            storage.clone(),
            config.keys.settings.clone(),
            config.default_settings.clone(),
        );
        let splash = SplashTracker::new(
            storage.clone(),
            config.keys.last_opened.clone(),
            config.splash_interval,
        );
        let orchestrator = Arc::new(LookupOrchestrator::new(
            storage.clone(),
            history.clone(),
            client,
            popup,
            config.keys.request_state.clone(),
            config.lookup_timeout,
        ));
        let command_handler = CommandHandler::new(orchestrator.clone());

        Self {
            config,
            storage,
            history,
            settings,
            splash,
            orchestrator,
            command_handler,
        }
    }
}
