//! Unix Domain Socket (UDS) ベースのシンプルな IPC モジュール。
//! `luno` CLI ↔ `lunod` デーモン間の通信で利用します。
//!
//! 1 行 1 JSON の改行区切りで、基本は 1 リクエスト 1 レスポンス。
//! `Watch` のみ接続が閉じられるまで状態変更を流し続けます。
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::DefinitionRequestState;
use crate::error::{LunoError, Result};

const SOCKET_FILENAME: &str = "luno.sock";
const DEFAULT_SOCKET_PATH: &str = "/tmp/luno.sock";

/// デーモンソケットパスを返します。
pub fn socket_path() -> PathBuf {
    if let Some(path) = socket_env("LUNO_SOCKET_PATH") {
        return PathBuf::from(path);
    }

    if let Some(dir) = socket_env("LUNO_SOCKET_DIR") {
        return PathBuf::from(dir).join(SOCKET_FILENAME);
    }

    PathBuf::from(DEFAULT_SOCKET_PATH)
}

/// CLI からデーモンへ送るコマンド列挙。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum IpcCmd {
    /// UI からの単語検索
    SearchWord { word: String },
    /// コンテキストメニューからの選択テキスト検索
    ContextMenu {
        #[serde(default)]
        selection: String,
    },
    /// 現在のリクエスト状態を取得
    Status,
    /// リクエスト状態の変更を購読
    Watch,
    Health,
}

/// デーモンからの汎用レスポンス。
#[derive(Debug, Serialize, Deserialize)]
pub struct IpcResp {
    pub ok: bool,
    pub msg: String,
}

impl IpcResp {
    pub fn ok(msg: impl Into<String>) -> Self {
        Self {
            ok: true,
            msg: msg.into(),
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            msg: msg.into(),
        }
    }

    /// `msg` に埋め込まれたリクエスト状態を取り出す
    pub fn request_state(&self) -> Option<DefinitionRequestState> {
        serde_json::from_str(&self.msg).ok()
    }
}

fn socket_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

async fn connect() -> Result<tokio::net::UnixStream> {
    let path = socket_path();
    if !Path::new(&path).exists() {
        return Err(LunoError::IpcConnectionFailed(format!(
            "daemon socket not found: {}",
            path.display()
        )));
    }
    tokio::net::UnixStream::connect(&path)
        .await
        .map_err(|e| LunoError::IpcConnectionFailed(e.to_string()))
}

fn current_thread_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| LunoError::SystemError(e.to_string()))
}

/// コマンドを送信して `IpcResp` を取得する同期ユーティリティ。
pub fn send_cmd(cmd: &IpcCmd) -> Result<IpcResp> {
    use futures::{SinkExt, StreamExt};
    use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

    current_thread_runtime()?.block_on(async {
        let (r, w) = connect().await?.into_split();
        let mut writer = FramedWrite::new(w, LinesCodec::new());
        let mut reader = FramedRead::new(r, LinesCodec::new());

        writer
            .send(serde_json::to_string(cmd)?)
            .await
            .map_err(|e| LunoError::IpcConnectionFailed(e.to_string()))?;
        match reader.next().await {
            Some(Ok(line)) => Ok(serde_json::from_str::<IpcResp>(&line)?),
            Some(Err(e)) => Err(LunoError::IpcConnectionFailed(e.to_string())),
            None => Err(LunoError::IpcConnectionFailed(
                "no response from daemon".into(),
            )),
        }
    })
}

/// `Watch` を送信し、状態が届くたびに `on_state` を呼ぶ同期ユーティリティ。
///
/// `on_state` が `false` を返すか、デーモンが接続を閉じると終了します。
/// 状態が削除された場合は `None` が渡されます。
pub fn watch_states<F>(mut on_state: F) -> Result<()>
where
    F: FnMut(Option<DefinitionRequestState>) -> bool,
{
    use futures::{SinkExt, StreamExt};
    use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

    current_thread_runtime()?.block_on(async {
        let (r, w) = connect().await?.into_split();
        let mut writer = FramedWrite::new(w, LinesCodec::new());
        let mut reader = FramedRead::new(r, LinesCodec::new());

        writer
            .send(serde_json::to_string(&IpcCmd::Watch)?)
            .await
            .map_err(|e| LunoError::IpcConnectionFailed(e.to_string()))?;

        while let Some(line) = reader.next().await {
            let line = line.map_err(|e| LunoError::IpcConnectionFailed(e.to_string()))?;
            let state = serde_json::from_str::<Option<DefinitionRequestState>>(&line)?;
            if !on_state(state) {
                break;
            }
        }
        Ok::<(), LunoError>(())
    })
}
