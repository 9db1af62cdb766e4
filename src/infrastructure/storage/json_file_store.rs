//! JSON ファイル版 KeyValueStore 実装
//!
//! ストレージディレクトリ配下に 1 キー 1 ファイル（`<key>.json`）で保存します。
//! 書き込みは一時ファイル + rename で行うため、キーごとにアトミックで、
//! 別プロセスが別キーを同時に書いても互いの値を消さない。
//!
//! 変更通知は同一プロセス内の書き込みなら即時に、他プロセスの書き込みは
//! 購読開始後にディレクトリを定期スキャンして差分から発行します。
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{Mutex, broadcast};
use tokio::time::MissedTickBehavior;

use crate::application::traits::{KeyValueStore, StorageChange};
use crate::error::{LunoError, Result};
use crate::infrastructure::config::data_dir;
use crate::utils::profiling;

const STORAGE_DIRNAME: &str = "storage";
const KEY_FILE_SUFFIX: &str = ".json";
const CHANGE_CHANNEL_CAPACITY: usize = 64;
/// 他プロセスの書き込みを拾うスキャン間隔
pub const WATCH_INTERVAL: Duration = Duration::from_millis(200);

/// 一時ファイル名の衝突回避用（プロセス内で一意）
static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

pub struct JsonFileStore {
    shared: Arc<Shared>,
}

struct Shared {
    dir: PathBuf,
    /// 監視中に把握している全キーの値。監視開始前は `None`
    ///
    /// プロセス内の書き込みとスキャンはこのロックで直列化される
    known: Mutex<Option<HashMap<String, Value>>>,
    watching: AtomicBool,
    changes: broadcast::Sender<StorageChange>,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                dir: dir.into(),
                known: Mutex::new(None),
                watching: AtomicBool::new(false),
                changes,
            }),
        }
    }

    /// データディレクトリ配下の storage/ を開く
    pub fn open_default() -> Result<Self> {
        let dir = data_dir().map_err(|e| LunoError::ConfigInitError(e.to_string()))?;
        Ok(Self::new(dir.join(STORAGE_DIRNAME)))
    }

    pub fn dir(&self) -> &Path {
        &self.shared.dir
    }

    /// 書き込み → 通知。削除対象が無ければ何もしない
    async fn modify(&self, key: &str, new_value: Option<Value>) -> Result<()> {
        let timer = profiling::Timer::start("storage.write");
        let shared = &self.shared;
        let mut known = shared.known.lock().await;
        let path = shared.key_path(key);

        let old_value = read_value(&path).await.unwrap_or_else(|e| {
            eprintln!("storage file unreadable, overwriting (key={key}): {e}");
            None
        });

        match &new_value {
            Some(value) => shared.write_value(&path, value).await?,
            None => match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
                Err(e) => return Err(LunoError::StorageUnavailable(e.to_string())),
            },
        }
        if let Some(known) = known.as_mut() {
            match &new_value {
                Some(value) => known.insert(key.to_string(), value.clone()),
                None => known.remove(key),
            };
        }
        timer.log_with(&format!("key={key}"));

        if old_value.is_none() && new_value.is_none() {
            return Ok(());
        }
        let _ = shared.changes.send(StorageChange {
            key: key.to_string(),
            old_value,
            new_value,
        });
        Ok(())
    }

    /// 初回購読時にディレクトリのスキャンタスクを起動
    fn start_watching(&self) {
        let shared = &self.shared;
        if shared.watching.swap(true, Ordering::SeqCst) {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            shared.watching.store(false, Ordering::SeqCst);
            eprintln!("storage watch requires a tokio runtime; cross-process changes disabled");
            return;
        };
        // 購読開始時点を基準にする。書き込み中で取れなければ初回スキャンが基準になる
        if let Ok(mut known) = shared.known.try_lock() {
            *known = Some(scan_dir(&shared.dir));
        }
        runtime.spawn(watch_loop(Arc::downgrade(shared)));
    }
}

impl Shared {
    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key_file_name(key))
    }

    async fn write_value(&self, path: &Path, value: &Value) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| LunoError::StorageUnavailable(e.to_string()))?;
        let tmp = path.with_extension(format!(
            "json.{}.{}.tmp",
            std::process::id(),
            TMP_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|e| LunoError::StorageUnavailable(e.to_string()))?;
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| LunoError::StorageUnavailable(e.to_string()))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| LunoError::StorageUnavailable(e.to_string()))?;
        Ok(())
    }

    /// ディレクトリを読み直し、把握している値との差分を通知
    async fn poll_changes(&self) {
        let mut known = self.known.lock().await;
        let dir = self.dir.clone();
        let current = match tokio::task::spawn_blocking(move || scan_dir(&dir)).await {
            Ok(current) => current,
            Err(e) => {
                eprintln!("storage scan failed: {e}");
                return;
            }
        };
        let Some(previous) = known.replace(current) else {
            return;
        };
        if let Some(current) = known.as_ref() {
            for change in diff_values(&previous, current) {
                let _ = self.changes.send(change);
            }
        }
    }
}

async fn watch_loop(shared: Weak<Shared>) {
    let mut ticker = tokio::time::interval(WATCH_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let Some(shared) = shared.upgrade() else {
            break;
        };
        shared.poll_changes().await;
    }
}

async fn read_value(path: &Path) -> Result<Option<Value>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(LunoError::StorageUnavailable(e.to_string())),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| LunoError::StorageUnavailable(format!("{}: {e}", path.display())))
}

/// 読めないファイル・壊れたファイルは値なしとして扱う
fn scan_dir(dir: &Path) -> HashMap<String, Value> {
    let mut values = HashMap::new();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return values;
    };
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(key) = name.to_str().and_then(key_from_file_name) else {
            continue;
        };
        let Ok(bytes) = std::fs::read(entry.path()) else {
            continue;
        };
        if let Ok(value) = serde_json::from_slice(&bytes) {
            values.insert(key, value);
        }
    }
    values
}

fn diff_values(
    previous: &HashMap<String, Value>,
    current: &HashMap<String, Value>,
) -> Vec<StorageChange> {
    let keys: BTreeSet<&String> = previous.keys().chain(current.keys()).collect();
    keys.into_iter()
        .filter(|key| previous.get(*key) != current.get(*key))
        .map(|key| StorageChange {
            key: key.clone(),
            old_value: previous.get(key).cloned(),
            new_value: current.get(key).cloned(),
        })
        .collect()
}

/// 英数字・`_`・`-` 以外を `%XX` にしたファイル名
fn key_file_name(key: &str) -> String {
    let mut name = String::with_capacity(key.len() + KEY_FILE_SUFFIX.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            name.push(byte as char);
        } else {
            name.push_str(&format!("%{byte:02X}"));
        }
    }
    name.push_str(KEY_FILE_SUFFIX);
    name
}

fn key_from_file_name(name: &str) -> Option<String> {
    let encoded = name.strip_suffix(KEY_FILE_SUFFIX)?;
    let mut bytes = Vec::with_capacity(encoded.len());
    let mut iter = encoded.bytes();
    while let Some(byte) = iter.next() {
        if byte == b'%' {
            let hi = (iter.next()? as char).to_digit(16)?;
            let lo = (iter.next()? as char).to_digit(16)?;
            bytes.push((hi * 16 + lo) as u8);
        } else {
            bytes.push(byte);
        }
    }
    String::from_utf8(bytes).ok()
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        read_value(&self.shared.key_path(key)).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.modify(key, Some(value)).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.modify(key, None).await
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        let rx = self.shared.changes.subscribe();
        self.start_watching();
        rx
    }
}
