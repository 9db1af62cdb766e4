//! UDS 越しの 1 リクエスト 1 レスポンスを、テスト内のサーバーで確認する
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use luno::{
    LunoError, Result,
    application::{AppConfig, ServiceContainer, traits::DefinitionClient},
    domain::{NormalizedDefinition, RequestPhase},
    infrastructure::storage::MemoryStore,
    ipc::{IpcCmd, send_cmd},
};
use tokio::net::UnixListener;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

struct EmptyDictionary;

#[async_trait]
impl DefinitionClient for EmptyDictionary {
    async fn lookup(&self, word: &str) -> Result<NormalizedDefinition> {
        Err(LunoError::NotFound(word.to_string()))
    }
}

#[test]
fn test_commands_round_trip_over_socket() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("luno.sock");
    unsafe {
        std::env::set_var("LUNO_SOCKET_PATH", &path);
    }

    let server_path = path.clone();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let container = ServiceContainer::with_dependencies(
                AppConfig::default(),
                Arc::new(MemoryStore::new()),
                Arc::new(EmptyDictionary),
                None,
            );
            let listener = UnixListener::bind(&server_path).unwrap();
            loop {
                let (stream, _) = listener.accept().await.unwrap();
                let (r, w) = stream.into_split();
                let mut reader = FramedRead::new(r, LinesCodec::new());
                let mut writer = FramedWrite::new(w, LinesCodec::new());
                if let Some(Ok(line)) = reader.next().await {
                    let cmd: IpcCmd = serde_json::from_str(&line).unwrap();
                    let resp = container.command_handler.handle(cmd).await.unwrap();
                    writer.send(serde_json::to_string(&resp).unwrap()).await.unwrap();
                }
            }
        });
    });

    for _ in 0..50 {
        if path.exists() {
            break;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    let health = send_cmd(&IpcCmd::Health).unwrap();
    assert!(health.ok);
    assert_eq!(health.msg, "ok");

    let status = send_cmd(&IpcCmd::Status).unwrap();
    assert!(status.request_state().is_none());

    let resp = send_cmd(&IpcCmd::SearchWord {
        word: "zzzx".into(),
    })
    .unwrap();
    assert!(resp.ok);
    let state = resp.request_state().unwrap();
    assert_eq!(state.phase(), RequestPhase::Error);
    assert_eq!(state.requested_word.as_deref(), Some("zzzx"));

    let status = send_cmd(&IpcCmd::Status).unwrap();
    assert_eq!(status.request_state(), Some(state));
}
