//! 辞書検索の状態遷移を統括するサービス
//!
//! # 状態遷移
//! `Idle → Loading → {Success, Error}`
//!
//! - 空白のみの入力は `Loading` を経由せずに `Error` へ遷移
//! - `Loading` の書き込みが UI 側のスピナー表示の同期点になる
//! - 成功時のみ履歴を更新する
//!
//! 同時に進行する検索は 1 件だけを想定しており、キューイングはしない。
//! 検索中に別のトリガーが来た場合は同じキーを上書きし、最後に書かれた状態が残る。

use std::sync::Arc;
use std::time::Duration;

use crate::application::HistoryManager;
use crate::application::traits::{DefinitionClient, PopupOpener};
use crate::domain::{DefinitionRequestState, NormalizedDefinition};
use crate::error::{LunoError, Result};
use crate::infrastructure::storage::Storage;
use crate::utils::profiling;

/// 検索のトリガー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupTrigger {
    /// コンテキストメニューからの選択テキスト
    ContextMenu { selection: String },
    /// UI からの明示的な検索リクエスト
    SearchRequest { word: String },
}

impl LookupTrigger {
    pub fn word(&self) -> &str {
        match self {
            LookupTrigger::ContextMenu { selection } => selection,
            LookupTrigger::SearchRequest { word } => word,
        }
    }
}

pub struct LookupOrchestrator {
    storage: Storage,
    history: HistoryManager,
    client: Arc<dyn DefinitionClient>,
    popup: Option<Arc<dyn PopupOpener>>,
    state_key: String,
    timeout: Duration,
}

impl LookupOrchestrator {
    pub fn new(
        storage: Storage,
        history: HistoryManager,
        client: Arc<dyn DefinitionClient>,
        popup: Option<Arc<dyn PopupOpener>>,
        state_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            storage,
            history,
            client,
            popup,
            state_key: state_key.into(),
            timeout,
        }
    }

    pub fn state_key(&self) -> &str {
        &self.state_key
    }

    /// トリガーを処理し、書き込んだ終端状態を返す
    pub async fn handle(&self, trigger: LookupTrigger) -> DefinitionRequestState {
        self.lookup(trigger.word()).await
    }

    /// 単語を検索し、終端状態（成功 / エラー）を返す
    ///
    /// 失敗は状態のエラーメッセージとして記録され、呼び出し元には伝播しない。
    pub async fn lookup(&self, word: &str) -> DefinitionRequestState {
        let timer = profiling::Timer::start("lookup.total");
        let selected = word.trim();

        if selected.is_empty() {
            let state = DefinitionRequestState::failure(LunoError::EmptyInput.to_string(), None);
            self.open_popup().await;
            self.write_state(&state).await;
            timer.log_with("outcome=empty");
            return state;
        }

        self.write_state(&DefinitionRequestState::loading(selected))
            .await;
        self.open_popup().await;

        let state = match self.fetch(selected).await {
            Ok(definition) => {
                self.history.add(selected).await;
                DefinitionRequestState::success(definition)
            }
            Err(e) => {
                eprintln!("lookup failed (word={selected}): {e:?}");
                DefinitionRequestState::failure(e.to_string(), Some(selected.to_string()))
            }
        };
        self.write_state(&state).await;

        timer.log_with(&format!(
            "word={selected} outcome={}",
            if state.error.is_some() { "error" } else { "success" }
        ));
        state
    }

    /// 共有ストレージ上の現在の状態。未検索・破損時は `None`
    pub async fn current_state(&self) -> Option<DefinitionRequestState> {
        let raw = self.storage.get(&self.state_key).await?;
        serde_json::from_value(raw).ok()
    }

    /// タイムアウト時は検索中の future を破棄するため、遅れて届いた結果は書き込まれない
    async fn fetch(&self, word: &str) -> Result<NormalizedDefinition> {
        let fetch_timer = profiling::Timer::start("lookup.fetch");
        let result = match tokio::time::timeout(self.timeout, self.client.lookup(word)).await {
            Ok(result) => result,
            Err(_) => Err(LunoError::Timeout),
        };
        fetch_timer.log();

        result?
            .retain_meaningful()
            .ok_or_else(|| LunoError::NotFound(word.to_string()))
    }

    async fn write_state(&self, state: &DefinitionRequestState) {
        self.storage.set_json(&self.state_key, state).await;
    }

    /// ポップアップ表示はベストエフォート。失敗しても検索は続行する
    async fn open_popup(&self) {
        if let Some(popup) = &self.popup {
            if let Err(e) = popup.open().await {
                eprintln!("popup open failed (ignored): {e}");
            }
        }
    }
}
