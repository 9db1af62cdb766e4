//! グローバル環境変数設定
//!
//! アプリケーション全体で使用する環境変数を一元管理。
//! プロセス起動時に一度だけ初期化し、以降はどこからでもアクセス可能。

use once_cell::sync::OnceCell;
use std::sync::Arc;

/// グローバル環境変数設定
static ENV_CONFIG: OnceCell<Arc<EnvConfig>> = OnceCell::new();

/// 環境変数設定
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    /// データディレクトリ（最優先）
    pub data_dir: Option<String>,
    /// XDG Data Home ディレクトリ
    pub xdg_data_home: Option<String>,
    /// 辞書 API のベース URL
    pub api_base_url: Option<String>,
    /// ポップアップ表示用コマンド
    pub popup_cmd: Option<String>,
    /// 検索タイムアウト（ミリ秒）
    pub lookup_timeout_ms: Option<u64>,
    /// 環境変数ファイルのパス
    pub env_path: Option<String>,
}

impl EnvConfig {
    fn from_env() -> Self {
        EnvConfig {
            data_dir: env_value("LUNO_DATA_DIR"),
            xdg_data_home: env_value("XDG_DATA_HOME"),
            api_base_url: env_value("LUNO_API_BASE_URL"),
            popup_cmd: env_value("LUNO_POPUP_CMD"),
            lookup_timeout_ms: env_value("LUNO_LOOKUP_TIMEOUT_MS").and_then(|v| v.parse().ok()),
            env_path: env_value("LUNO_ENV_PATH"),
        }
    }

    /// 環境変数から設定を初期化
    ///
    /// アプリケーション起動時に呼び出す。
    /// 既に初期化済みの場合は何もしない（冪等）。
    pub fn init() {
        // 並列実行時の競合を考慮：既に他のスレッドが初期化していても成功とする
        let _ = ENV_CONFIG.set(Arc::new(Self::from_env()));
    }

    /// 設定を取得（未初期化ならこの時点の環境変数で初期化）
    pub fn get() -> Arc<EnvConfig> {
        ENV_CONFIG
            .get_or_init(|| Arc::new(Self::from_env()))
            .clone()
    }
}

/// 前後空白を除去し、空文字列は未設定として扱う
fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 初期化は何度呼んでも同じ設定を返す
    #[test]
    fn init_is_idempotent() {
        EnvConfig::init();
        let first = EnvConfig::get();
        EnvConfig::init();
        assert!(Arc::ptr_eq(&first, &EnvConfig::get()));
    }

    #[test]
    fn blank_env_values_are_ignored() {
        unsafe {
            std::env::set_var("LUNO_TEST_BLANK_VALUE", "   ");
        }
        assert_eq!(env_value("LUNO_TEST_BLANK_VALUE"), None);
        unsafe {
            std::env::remove_var("LUNO_TEST_BLANK_VALUE");
        }
    }
}
