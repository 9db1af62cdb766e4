//! Free Dictionary API クライアント
//!
//! `GET <base>/<word>` のレスポンス（エントリ配列）の先頭を
//! [`NormalizedDefinition`] へ変換します。
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{StatusCode, Url};
use serde::Deserialize;

use crate::application::traits::DefinitionClient;
use crate::domain::{DefinitionItem, Meaning, NormalizedDefinition};
use crate::error::{LunoError, Result};
use crate::utils::clock::now_ms;

/// 文字・結合記号・アポストロフィ・ハイフン以外
static NON_WORD_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{M}'-]+").expect("static regex is valid"));

#[derive(Debug, Deserialize)]
struct ApiEntry {
    #[serde(default)]
    word: Option<String>,
    #[serde(default)]
    phonetic: Option<String>,
    #[serde(default)]
    phonetics: Option<Vec<ApiPhonetic>>,
    #[serde(default)]
    meanings: Option<Vec<ApiMeaning>>,
}

#[derive(Debug, Deserialize)]
struct ApiPhonetic {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiMeaning {
    #[serde(default)]
    part_of_speech: Option<String>,
    #[serde(default)]
    definitions: Option<Vec<ApiDefinition>>,
}

#[derive(Debug, Deserialize)]
struct ApiDefinition {
    #[serde(default)]
    definition: Option<String>,
    #[serde(default)]
    example: Option<String>,
}

/// 検索クエリ用に単語を整形します。
///
/// 単語以外の文字を空白に置き換え、最初のトークンを小文字化して返します。
/// 何も残らなければ `None`。
pub fn clean_word(word: &str) -> Option<String> {
    NON_WORD_CHARS
        .replace_all(word.trim(), " ")
        .split_whitespace()
        .next()
        .map(str::to_lowercase)
}

/// API レスポンスを正規化。語義が残らなければ `NotFound`
fn normalize_entries(
    entries: Vec<ApiEntry>,
    requested: &str,
    now: i64,
) -> Result<NormalizedDefinition> {
    let entry = entries
        .into_iter()
        .next()
        .ok_or_else(|| LunoError::NotFound(requested.to_string()))?;

    let phonetic = entry
        .phonetic
        .filter(|p| !p.is_empty())
        .or_else(|| {
            entry
                .phonetics
                .unwrap_or_default()
                .into_iter()
                .filter_map(|p| p.text)
                .find(|t| !t.is_empty())
        });

    let meanings = entry
        .meanings
        .unwrap_or_default()
        .into_iter()
        .map(|m| Meaning {
            part_of_speech: m.part_of_speech.unwrap_or_default(),
            definitions: m
                .definitions
                .unwrap_or_default()
                .into_iter()
                .filter_map(|d| {
                    Some(DefinitionItem {
                        definition: d.definition?,
                        example: d.example,
                    })
                })
                .collect(),
        })
        .collect();

    NormalizedDefinition {
        word: entry
            .word
            .filter(|w| !w.is_empty())
            .unwrap_or_else(|| requested.to_string()),
        phonetic,
        meanings,
        timestamp: now,
    }
    .retain_meaningful()
    .ok_or_else(|| LunoError::NotFound(requested.to_string()))
}

fn map_request_error(e: reqwest::Error) -> LunoError {
    if e.is_timeout() {
        LunoError::Timeout
    } else {
        LunoError::TransportFailure(e.to_string())
    }
}

/// Free Dictionary API アダプター
pub struct DictionaryApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DictionaryApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| LunoError::ConfigInitError(format!("invalid api base url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(LunoError::ConfigInitError(format!(
                "api base url cannot be a base: {base_url}"
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LunoError::ConfigInitError(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    /// 単語をパスセグメントとしてエンコードした URL
    pub fn entry_url(&self, word: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(word);
        }
        url
    }
}

#[async_trait]
impl DefinitionClient for DictionaryApiClient {
    async fn lookup(&self, word: &str) -> Result<NormalizedDefinition> {
        let requested = word.trim();
        let cleaned = clean_word(requested).ok_or(LunoError::InvalidWord)?;

        let response = self
            .http
            .get(self.entry_url(&cleaned))
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LunoError::NotFound(requested.to_string()));
        }
        if !status.is_success() {
            return Err(LunoError::TransportFailure(format!(
                "dictionary api returned {status}"
            )));
        }

        let entries: Vec<ApiEntry> = response.json().await.map_err(map_request_error)?;
        normalize_entries(entries, requested, now_ms())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Vec<ApiEntry> {
        serde_json::from_str(json).unwrap()
    }

    /// 記号を除去して最初の単語だけを小文字で返す
    #[test]
    fn clean_word_keeps_first_token() {
        assert_eq!(clean_word("  Running fast"), Some("running".into()));
        assert_eq!(clean_word("\"Don't!\""), Some("don't".into()));
        assert_eq!(clean_word("well-known, yes"), Some("well-known".into()));
        assert_eq!(clean_word("Café"), Some("café".into()));
        assert_eq!(clean_word("123 !!"), None);
        assert_eq!(clean_word("   "), None);
    }

    /// phonetic が無い場合は phonetics の最初のテキストを使う
    #[test]
    fn normalize_uses_first_phonetic_text() {
        let entries = parse(
            r#"[{"word":"run","phonetics":[{"audio":"x.mp3"},{"text":"/rʌn/"}],
                "meanings":[{"partOfSpeech":"verb","definitions":[
                    {"definition":"move swiftly","example":"run home","synonyms":[]}]}]}]"#,
        );

        let def = normalize_entries(entries, "Run", 42).unwrap();
        assert_eq!(def.word, "run");
        assert_eq!(def.phonetic.as_deref(), Some("/rʌn/"));
        assert_eq!(def.timestamp, 42);
        assert_eq!(def.meanings[0].definitions[0].example.as_deref(), Some("run home"));
    }

    /// 空の語義と語義の無い品詞は取り除かれる
    #[test]
    fn normalize_drops_empty_meanings() {
        let entries = parse(
            r#"[{"word":"set","phonetic":"","meanings":[
                {"partOfSpeech":"noun","definitions":[{"definition":""}]},
                {"partOfSpeech":"verb","definitions":[{"definition":"put"}, {"definition":""}]}]}]"#,
        );

        let def = normalize_entries(entries, "set", 0).unwrap();
        assert_eq!(def.phonetic, None);
        assert_eq!(def.meanings.len(), 1);
        assert_eq!(def.meanings[0].part_of_speech, "verb");
        assert_eq!(def.meanings[0].definitions.len(), 1);
    }

    /// 空配列・語義なしは NotFound
    #[test]
    fn normalize_reports_not_found() {
        assert_eq!(
            normalize_entries(Vec::new(), "Zzz", 0),
            Err(LunoError::NotFound("Zzz".into()))
        );
        let entries = parse(r#"[{"word":"zzz","meanings":[]}]"#);
        assert_eq!(
            normalize_entries(entries, "Zzz", 0),
            Err(LunoError::NotFound("Zzz".into()))
        );
    }

    /// null の語義はその項目だけ捨て、残りは使う
    #[test]
    fn normalize_skips_null_definitions() {
        let entries = parse(
            r#"[{"word":"run","phonetics":null,"meanings":[
                {"partOfSpeech":null,"definitions":null},
                {"partOfSpeech":"verb","definitions":[{"definition":null},{"definition":"move fast"}]}]}]"#,
        );

        let def = normalize_entries(entries, "run", 0).unwrap();
        assert_eq!(def.meanings.len(), 1);
        assert_eq!(def.meanings[0].definitions.len(), 1);
        assert_eq!(def.meanings[0].definitions[0].definition, "move fast");
    }

    /// エントリに word が無ければ要求した単語を使う
    #[test]
    fn normalize_falls_back_to_requested_word() {
        let entries =
            parse(r#"[{"meanings":[{"partOfSpeech":"noun","definitions":[{"definition":"a"}]}]}]"#);
        assert_eq!(normalize_entries(entries, "Thing", 0).unwrap().word, "Thing");
    }

    #[test]
    fn entry_url_encodes_word_as_path_segment() {
        let client = DictionaryApiClient::new(
            "https://api.dictionaryapi.dev/api/v2/entries/en/",
            Duration::from_secs(10),
        )
        .unwrap();
        assert_eq!(
            client.entry_url("don't").as_str(),
            "https://api.dictionaryapi.dev/api/v2/entries/en/don't"
        );
        assert_eq!(
            client.entry_url("café").as_str(),
            "https://api.dictionaryapi.dev/api/v2/entries/en/caf%C3%A9"
        );
    }

    /// 不正な単語はネットワークに出る前に失敗する
    #[tokio::test]
    async fn invalid_word_fails_before_request() {
        let client =
            DictionaryApiClient::new("http://127.0.0.1:9/entries", Duration::from_secs(1)).unwrap();
        assert_eq!(client.lookup("!!! 42").await, Err(LunoError::InvalidWord));
    }

    #[test]
    fn invalid_base_url_is_config_error() {
        assert!(matches!(
            DictionaryApiClient::new("not a url", Duration::from_secs(1)),
            Err(LunoError::ConfigInitError(_))
        ));
    }
}
