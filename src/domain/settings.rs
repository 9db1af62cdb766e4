//! ユーザー設定エンティティと正規化ロジック – ドメイン層

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// ショートカット表示のデフォルト値
pub const DEFAULT_SHORTCUT: &str = "Ctrl+Shift+L";

/// 表示テーマ
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Auto,
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// 列挙値に一致する文字列のみ受け付ける
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "auto" => Some(Theme::Auto),
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Auto => write!(f, "auto"),
            Theme::Dark => write!(f, "dark"),
            Theme::Light => write!(f, "light"),
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::parse(s).ok_or_else(|| format!("unknown theme: {s} (expected auto, dark or light)"))
    }
}

/// ユーザー設定（正規化後は常に全フィールドが埋まっている）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsState {
    pub theme: Theme,
    /// 外部で設定されたキーボードショートカットの表示用ラベル
    pub shortcut: String,
}

impl SettingsState {
    pub fn with_default_shortcut(shortcut: impl Into<String>) -> Self {
        Self {
            theme: Theme::default(),
            shortcut: shortcut.into(),
        }
    }
}

impl Default for SettingsState {
    fn default() -> Self {
        Self::with_default_shortcut(DEFAULT_SHORTCUT)
    }
}

/// 更新対象の設定フィールド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingUpdate {
    Theme(Theme),
    Shortcut(String),
}

impl SettingUpdate {
    pub fn apply(self, settings: &mut SettingsState) {
        match self {
            SettingUpdate::Theme(theme) => settings.theme = theme,
            SettingUpdate::Shortcut(shortcut) => settings.shortcut = shortcut,
        }
    }
}

/// 任意の JSON 値を設定へ正規化します。
///
/// オブジェクトでなければデフォルトを丸ごと返し、そうでなければフィールドごとに
/// 独立して検証してデフォルトへフォールバックします。
pub fn normalize_settings(raw: &Value, defaults: &SettingsState) -> SettingsState {
    let Some(record) = raw.as_object() else {
        return defaults.clone();
    };

    SettingsState {
        theme: record
            .get("theme")
            .and_then(Value::as_str)
            .and_then(Theme::parse)
            .unwrap_or(defaults.theme),
        shortcut: record
            .get("shortcut")
            .and_then(Value::as_str)
            .map_or_else(|| defaults.shortcut.clone(), str::to_string),
    }
}
