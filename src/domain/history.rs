//! 検索履歴エンティティと正規化ロジック – ドメイン層
//!
//! 永続化されたデータは破損している可能性があるため、読み出し時に必ず
//! [`sanitize_history`] を通してから扱います。

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 履歴の最大件数
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// 1 件の検索履歴
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// 表示用の単語（前後空白除去済み、大文字小文字は保持）
    pub word: String,
    /// 最終検索時刻（エポックミリ秒）
    pub timestamp: i64,
    /// 検索回数
    pub count: u32,
}

impl HistoryEntry {
    /// 同一性判定用のキー（大文字小文字を区別しない）
    pub fn key(&self) -> String {
        word_key(&self.word)
    }

    pub fn matches(&self, word: &str) -> bool {
        self.key() == word_key(word)
    }
}

/// 単語を比較用キーに変換します。
pub fn word_key(word: &str) -> String {
    word.trim().to_lowercase()
}

/// 任意の JSON 値を履歴リストへ正規化します。
///
/// - 配列でなければ空リスト
/// - オブジェクトでない要素、`word` が空文字列の要素はスキップ
/// - 大文字小文字を無視した重複は最初の出現を採用
/// - `timestamp` が数値でなければ `now_ms`、`count` が正の整数でなければ 1
/// - `limit` 件に達した時点で打ち切り
///
/// 純粋関数であり、出力を再度入力しても結果は変わりません。
pub fn sanitize_history(raw: &Value, limit: usize, now_ms: i64) -> Vec<HistoryEntry> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };

    let mut entries: Vec<HistoryEntry> = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for item in items {
        if entries.len() >= limit {
            break;
        }
        let Some(record) = item.as_object() else {
            continue;
        };
        let Some(word) = record.get("word").and_then(Value::as_str).map(str::trim) else {
            continue;
        };
        if word.is_empty() || !seen.insert(word_key(word)) {
            continue;
        }

        entries.push(HistoryEntry {
            word: word.to_string(),
            timestamp: record
                .get("timestamp")
                .and_then(coerce_timestamp)
                .unwrap_or(now_ms),
            count: record.get("count").and_then(coerce_count).unwrap_or(1),
        });
    }

    entries
}

fn coerce_timestamp(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|v| v.is_finite())
            .map(|v| v.trunc() as i64)
    })
}

/// 小数は 0 方向へ切り捨て。1 未満は無効扱い
fn coerce_count(value: &Value) -> Option<u32> {
    let raw = value.as_f64().filter(|v| v.is_finite())?.trunc();
    if raw < 1.0 {
        return None;
    }
    Some(if raw >= u32::MAX as f64 { u32::MAX } else { raw as u32 })
}

/// 単語の検索を履歴へ反映した新しいリストを返します。
///
/// 既存エントリがあれば回数を加算し、最初に記録された表記を保持したまま先頭へ移動します。
/// `word` が空なら `entries` をそのまま返します。
pub fn record_lookup(
    entries: &[HistoryEntry],
    word: &str,
    now_ms: i64,
    limit: usize,
) -> Vec<HistoryEntry> {
    let word = word.trim();
    if word.is_empty() {
        return entries.to_vec();
    }

    let existing = entries.iter().find(|e| e.matches(word));
    let updated = HistoryEntry {
        word: existing.map_or_else(|| word.to_string(), |e| e.word.clone()),
        timestamp: now_ms,
        count: existing.map_or(1, |e| e.count.saturating_add(1)),
    };

    std::iter::once(updated)
        .chain(entries.iter().filter(|e| !e.matches(word)).cloned())
        .take(limit)
        .collect()
}

/// 指定した単語を除いたリストを返します。
pub fn without_word(entries: &[HistoryEntry], word: &str) -> Vec<HistoryEntry> {
    entries.iter().filter(|e| !e.matches(word)).cloned().collect()
}
