//! 辞書定義とリクエスト状態 – ドメイン層
//!
//! リクエスト状態はバックグラウンドプロセスと UI の間で共有ストレージを介して
//! 受け渡されるため、JSON 表現は camelCase で固定します。

use serde::{Deserialize, Serialize};

/// 1 つの語義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionItem {
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

/// 品詞ごとの語義リスト
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meaning {
    pub part_of_speech: String,
    pub definitions: Vec<DefinitionItem>,
}

/// 正規化済みの辞書定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedDefinition {
    pub word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    pub meanings: Vec<Meaning>,
    /// 取得時刻（エポックミリ秒）
    pub timestamp: i64,
}

impl NormalizedDefinition {
    /// 空の語義と語義を持たない品詞を取り除きます。
    ///
    /// 何も残らなければ `None`（＝見つからなかった扱い）を返します。
    pub fn retain_meaningful(mut self) -> Option<Self> {
        for meaning in &mut self.meanings {
            meaning
                .definitions
                .retain(|d| !d.definition.is_empty());
        }
        self.meanings.retain(|m| !m.definitions.is_empty());
        if self.meanings.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

/// 検索リクエストの状態
///
/// `loading == true` のとき `data` と `error` は必ず `None`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionRequestState {
    pub loading: bool,
    pub error: Option<String>,
    pub data: Option<NormalizedDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_word: Option<String>,
}

/// リクエスト状態の遷移段階
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Idle,
    Loading,
    Success,
    Error,
}

impl DefinitionRequestState {
    pub fn loading(word: impl Into<String>) -> Self {
        Self {
            loading: true,
            error: None,
            data: None,
            requested_word: Some(word.into()),
        }
    }

    pub fn success(definition: NormalizedDefinition) -> Self {
        Self {
            loading: false,
            error: None,
            requested_word: Some(definition.word.clone()),
            data: Some(definition),
        }
    }

    pub fn failure(message: impl Into<String>, requested_word: Option<String>) -> Self {
        Self {
            loading: false,
            error: Some(message.into()),
            data: None,
            requested_word,
        }
    }

    pub fn phase(&self) -> RequestPhase {
        if self.loading {
            RequestPhase::Loading
        } else if self.error.is_some() {
            RequestPhase::Error
        } else if self.data.is_some() {
            RequestPhase::Success
        } else {
            RequestPhase::Idle
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase(), RequestPhase::Success | RequestPhase::Error)
    }
}
