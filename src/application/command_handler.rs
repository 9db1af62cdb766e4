//! IPCコマンドハンドラー
//!
//! # 責任
//! - IPCコマンドの処理と検索サービスへの委譲
//! - レスポンスの生成
//!
//! 検索自体の失敗はリクエスト状態に記録されるため、レスポンスは `ok: true` になる。
//! `ok: false` はメッセージ自体を処理できなかった場合のみ。

use std::sync::Arc;

use crate::application::{LookupOrchestrator, LookupTrigger};
use crate::error::Result;
use crate::ipc::{IpcCmd, IpcResp};

/// コマンドハンドラー
#[derive(Clone)]
pub struct CommandHandler {
    orchestrator: Arc<LookupOrchestrator>,
}

impl CommandHandler {
    pub fn new(orchestrator: Arc<LookupOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// IPCコマンドを処理
    ///
    /// `Watch` はストリーミングのためデーモン側で直接処理する
    pub async fn handle(&self, cmd: IpcCmd) -> Result<IpcResp> {
        match cmd {
            IpcCmd::SearchWord { word } => {
                self.handle_lookup(LookupTrigger::SearchRequest { word })
                    .await
            }
            IpcCmd::ContextMenu { selection } => {
                self.handle_lookup(LookupTrigger::ContextMenu { selection })
                    .await
            }
            IpcCmd::Status => self.handle_status().await,
            IpcCmd::Watch => Ok(IpcResp::error("watch requires a streaming connection")),
            IpcCmd::Health => Ok(IpcResp::ok("ok")),
        }
    }

    /// 終端状態まで待ってから JSON で返す
    async fn handle_lookup(&self, trigger: LookupTrigger) -> Result<IpcResp> {
        let state = self.orchestrator.handle(trigger).await;
        Ok(IpcResp::ok(serde_json::to_string(&state)?))
    }

    async fn handle_status(&self) -> Result<IpcResp> {
        let state = self.orchestrator.current_state().await;
        Ok(IpcResp::ok(serde_json::to_string(&state)?))
    }
}
