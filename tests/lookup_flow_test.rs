use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use luno::{
    LunoError, Result,
    application::{AppConfig, LookupTrigger, ServiceContainer, traits::DefinitionClient},
    domain::{DefinitionItem, Meaning, NormalizedDefinition, RequestPhase},
    infrastructure::storage::{JsonFileStore, MemoryStore},
};

/// "run" だけを知っている辞書
struct RunOnlyDictionary;

#[async_trait]
impl DefinitionClient for RunOnlyDictionary {
    async fn lookup(&self, word: &str) -> Result<NormalizedDefinition> {
        if word.trim().to_lowercase() != "run" {
            return Err(LunoError::NotFound(word.to_string()));
        }
        Ok(NormalizedDefinition {
            word: "run".into(),
            phonetic: Some("/rʌn/".into()),
            meanings: vec![Meaning {
                part_of_speech: "verb".into(),
                definitions: vec![DefinitionItem {
                    definition: "move at a speed faster than a walk".into(),
                    example: None,
                }],
            }],
            timestamp: 1,
        })
    }
}

fn container_with(store: Arc<MemoryStore>) -> ServiceContainer {
    ServiceContainer::with_dependencies(
        AppConfig::default(),
        store,
        Arc::new(RunOnlyDictionary),
        None,
    )
}

/// 選択テキストから成功までの状態遷移と履歴記録
#[tokio::test]
async fn context_menu_lookup_goes_through_loading_to_success() {
    let container = container_with(Arc::new(MemoryStore::new()));
    let key = container.config.keys.request_state.clone();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let _watch = container.storage.on_change(key, move |change| {
        let state = change
            .new_value
            .and_then(|v| serde_json::from_value::<luno::domain::DefinitionRequestState>(v).ok());
        if let Some(state) = state {
            sink.lock().unwrap().push(state.phase());
        }
    });

    let state = container
        .orchestrator
        .handle(LookupTrigger::ContextMenu {
            selection: " Run ".into(),
        })
        .await;

    assert_eq!(state.phase(), RequestPhase::Success);
    assert_eq!(state.data.as_ref().unwrap().word, "run");

    let history = container.history.list().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].word, "Run");
    assert_eq!(history[0].count, 1);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(
        *seen.lock().unwrap(),
        vec![RequestPhase::Loading, RequestPhase::Success]
    );
}

/// 見つからない単語はエラー状態になり履歴に残らない
#[tokio::test]
async fn unknown_word_is_reported_and_not_recorded() {
    let container = container_with(Arc::new(MemoryStore::new()));

    let state = container.orchestrator.lookup("zzzx").await;

    assert_eq!(state.phase(), RequestPhase::Error);
    assert_eq!(
        state.error.as_deref(),
        Some("No definition found for \"zzzx\"")
    );
    assert!(container.history.list().await.is_empty());
    assert_eq!(container.orchestrator.current_state().await, Some(state));
}

/// 同じ単語を大文字小文字違いで検索するとカウントが増える
#[tokio::test]
async fn repeated_lookups_share_one_history_entry() {
    let container = container_with(Arc::new(MemoryStore::new()));

    container.orchestrator.lookup("Run").await;
    container.orchestrator.lookup("run").await;

    let history = container.history.list().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].count, 2);
}

/// ファイルストアを共有する別プロセス相当のコンテナから履歴と状態が見える
#[tokio::test]
async fn file_store_is_shared_between_containers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage");

    let daemon = ServiceContainer::with_dependencies(
        AppConfig::default(),
        Arc::new(JsonFileStore::new(&path)),
        Arc::new(RunOnlyDictionary),
        None,
    );
    daemon.orchestrator.lookup("run").await;

    let cli = ServiceContainer::with_dependencies(
        AppConfig::default(),
        Arc::new(JsonFileStore::new(&path)),
        Arc::new(RunOnlyDictionary),
        None,
    );
    let history = cli.history.list().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].word, "run");

    let state = cli.orchestrator.current_state().await.unwrap();
    assert_eq!(state.phase(), RequestPhase::Success);

    cli.history.clear().await;
    assert!(daemon.history.list().await.is_empty());
}
