//! lunod: 辞書検索を統括する常駐プロセス（シングルスレッド Tokio ランタイム）
//!
//! # 概要
//! CLI から Unix Domain Socket (UDS) 経由で受け取ったコマンドをハンドリングし、
//! 検索トリガーの処理・リクエスト状態の永続化・履歴記録を行います。
//!
//! *ソケットパス*: `ipc::socket_path()`（既定 `/tmp/luno.sock`）
//!
//! ## 実行モデル
//! - `tokio::main(flavor = "current_thread")` でシングルスレッドランタイムを起動
//! - クライアントごとの処理はタスク化し、検索同士は並行に進む
//! - `Watch` 接続は切断されるまでリクエスト状態の変更を 1 行ずつ送る

use std::{error::Error, fs};

use futures::{SinkExt, StreamExt};
use luno::{
    application::{CommandHandler, ServiceContainer},
    domain::DefinitionRequestState,
    infrastructure::storage::Storage,
    ipc::{IpcCmd, IpcResp, socket_path},
    utils::{config::EnvConfig, env::load_env},
};
use tokio::{
    net::{UnixListener, UnixStream},
    signal::unix::{SignalKind, signal},
};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    load_env();
    EnvConfig::init();

    let container = ServiceContainer::new()?;
    let handler = container.command_handler.clone();
    let storage = container.storage.clone();
    let state_key = container.config.keys.request_state.clone();

    // SIGTERM ハンドラはソケット作成前に登録する
    let mut terminate = signal(SignalKind::terminate())?;
    let path = socket_path();
    let _ = fs::remove_file(&path);
    let listener = UnixListener::bind(&path)?;
    scopeguard::defer! {
        let _ = fs::remove_file(&path);
    }
    println!("lunod listening on {}", path.display());

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, _) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        eprintln!("accept error: {e}");
                        continue;
                    }
                };
                let handler = handler.clone();
                let storage = storage.clone();
                let state_key = state_key.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_client(stream, handler, storage, state_key).await {
                        eprintln!("client error: {e}");
                    }
                });
            }
            _ = tokio::signal::ctrl_c() => {
                println!("lunod shutting down (SIGINT)");
                break;
            }
            _ = terminate.recv() => {
                println!("lunod shutting down (SIGTERM)");
                break;
            }
        }
    }
    Ok(())
}

// ────────────────────── クライアント処理 ──────────────────────

/// 1 接続分のコマンドを処理します。
async fn handle_client(
    stream: UnixStream,
    handler: CommandHandler,
    storage: Storage,
    state_key: String,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let (r, w) = stream.into_split();
    let mut reader = FramedRead::new(r, LinesCodec::new());
    let mut writer = FramedWrite::new(w, LinesCodec::new());

    let Some(Ok(line)) = reader.next().await else {
        return Ok(());
    };

    let cmd = match serde_json::from_str::<IpcCmd>(&line) {
        Ok(cmd) => cmd,
        Err(e) => {
            let resp = IpcResp::error(format!("invalid command: {e}"));
            writer.send(serde_json::to_string(&resp)?).await?;
            return Ok(());
        }
    };

    if cmd == IpcCmd::Watch {
        return stream_states(&mut reader, &mut writer, &storage, &state_key).await;
    }

    let resp = handler
        .handle(cmd)
        .await
        .unwrap_or_else(|e| IpcResp::error(e.to_string()));
    writer.send(serde_json::to_string(&resp)?).await?;
    Ok(())
}

/// 現在の状態を送った後、クライアントが切断するまで変更を送り続ける
async fn stream_states<R, W>(
    reader: &mut FramedRead<R, LinesCodec>,
    writer: &mut FramedWrite<W, LinesCodec>,
    storage: &Storage,
    state_key: &str,
) -> Result<(), Box<dyn Error + Send + Sync>>
where
    R: tokio::io::AsyncRead + Unpin,
    W: tokio::io::AsyncWrite + Unpin,
{
    // 購読を先に開始して、初回送信との間の変更を取りこぼさない
    let mut watcher = storage.watch(state_key);
    let current = parse_state(storage.get(state_key).await);
    writer.send(serde_json::to_string(&current)?).await?;

    loop {
        tokio::select! {
            change = watcher.next() => {
                let Some(change) = change else { break };
                let state = parse_state(change.new_value);
                writer.send(serde_json::to_string(&state)?).await?;
            }
            line = reader.next() => {
                if line.is_none() {
                    break;
                }
            }
        }
    }
    Ok(())
}

fn parse_state(value: Option<serde_json::Value>) -> Option<DefinitionRequestState> {
    value.and_then(|v| serde_json::from_value(v).ok())
}
