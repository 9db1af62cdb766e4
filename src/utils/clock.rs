/// 現在時刻（エポックミリ秒）
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
