//! 統一エラーハンドリング
//!
//! このモジュールは luno 全体で使用する統一エラー型を定義します。
//! 検索失敗はすべてリクエスト状態のエラーメッセージとしてユーザーに提示され、
//! バックグラウンドプロセスを停止させることはありません。

use thiserror::Error;

/// luno 全体で使用する統一エラー型
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LunoError {
    // ========================================
    // 入力関連エラー
    // ========================================
    #[error("Please highlight a word to look up")]
    EmptyInput,

    #[error("Please select a valid word")]
    InvalidWord,

    // ========================================
    // 辞書検索関連エラー
    // ========================================
    #[error("No definition found for \"{0}\"")]
    NotFound(String),

    #[error("Request timed out. Please try again.")]
    Timeout,

    /// 詳細はログ用。ユーザーには固定メッセージのみ表示する
    #[error("Failed to fetch definition")]
    TransportFailure(String),

    // ========================================
    // ストレージ関連エラー
    // ========================================
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    // ========================================
    // IPC関連エラー
    // ========================================
    #[error("IPC connection failed: {0}")]
    IpcConnectionFailed(String),

    #[error("IPC serialization error: {0}")]
    IpcSerializationError(String),

    // ========================================
    // 設定関連エラー
    // ========================================
    #[error("Configuration initialization error: {0}")]
    ConfigInitError(String),

    #[error("System error: {0}")]
    SystemError(String),
}

/// 統一Result型エイリアス
pub type Result<T> = std::result::Result<T, LunoError>;

// ========================================
// 外部エラー型からの自動変換実装
// ========================================

impl From<serde_json::Error> for LunoError {
    fn from(error: serde_json::Error) -> Self {
        LunoError::IpcSerializationError(error.to_string())
    }
}

impl From<std::io::Error> for LunoError {
    fn from(error: std::io::Error) -> Self {
        LunoError::SystemError(error.to_string())
    }
}

impl From<String> for LunoError {
    fn from(message: String) -> Self {
        LunoError::SystemError(message)
    }
}

impl From<&str> for LunoError {
    fn from(message: &str) -> Self {
        LunoError::SystemError(message.to_string())
    }
}

impl From<LunoError> for String {
    fn from(error: LunoError) -> Self {
        error.to_string()
    }
}

// ========================================
// ヘルパー関数
// ========================================

impl LunoError {
    /// 検索の終端エラー状態として表示されるべきエラーかどうか
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            LunoError::EmptyInput
                | LunoError::InvalidWord
                | LunoError::NotFound(_)
                | LunoError::Timeout
                | LunoError::TransportFailure(_)
        )
    }

    /// エラーがユーザーアクションで解決可能かどうかを判定
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            LunoError::EmptyInput | LunoError::InvalidWord | LunoError::ConfigInitError(_)
        )
    }

    /// エラーの重要度レベルを取得（ログレベル代替）
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LunoError::ConfigInitError(_) => ErrorSeverity::Error,

            LunoError::StorageUnavailable(_)
            | LunoError::IpcConnectionFailed(_)
            | LunoError::TransportFailure(_) => ErrorSeverity::Warning,

            LunoError::NotFound(_) | LunoError::Timeout => ErrorSeverity::Info,

            _ => ErrorSeverity::Debug,
        }
    }
}

/// エラーの重要度レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// ユーザー向けメッセージが固定文言になる
    #[test]
    fn lookup_errors_render_user_messages() {
        assert_eq!(
            LunoError::EmptyInput.to_string(),
            "Please highlight a word to look up"
        );
        assert_eq!(
            LunoError::NotFound("Run".into()).to_string(),
            "No definition found for \"Run\""
        );
        assert_eq!(
            LunoError::TransportFailure("connection reset".into()).to_string(),
            "Failed to fetch definition"
        );
    }

    /// ストレージ障害は検索失敗として扱われない
    #[test]
    fn storage_errors_are_not_lookup_failures() {
        assert!(LunoError::Timeout.is_lookup_failure());
        assert!(!LunoError::StorageUnavailable("disk".into()).is_lookup_failure());
        assert_eq!(
            LunoError::StorageUnavailable("disk".into()).severity(),
            ErrorSeverity::Warning
        );
    }
}
