//! `LUNO_PROFILE=1` で有効になる計測ログ
//!
//! 出力形式: `PROFILE label=<label> ms=<elapsed> [extra]`（stderr）
use std::sync::OnceLock;
use std::time::Instant;

const PROFILE_ENV: &str = "LUNO_PROFILE";

#[cfg(test)]
use std::sync::atomic::{AtomicI8, AtomicUsize, Ordering};

#[cfg(test)]
static ENABLED_OVERRIDE: AtomicI8 = AtomicI8::new(-1);
#[cfg(test)]
static LOG_COUNT: AtomicUsize = AtomicUsize::new(0);

/// プロファイルログが有効かを返す。
pub fn enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    #[cfg(test)]
    {
        let override_value = ENABLED_OVERRIDE.load(Ordering::SeqCst);
        if override_value >= 0 {
            return override_value == 1;
        }
    }
    *ENABLED.get_or_init(|| {
        std::env::var(PROFILE_ENV)
            .map(|value| {
                matches!(
                    value.trim().to_ascii_lowercase().as_str(),
                    "1" | "true" | "yes" | "on"
                )
            })
            .unwrap_or(false)
    })
}

/// 計測タイマー。`log` / `log_with` で消費される
pub struct Timer {
    label: &'static str,
    start: Instant,
}

impl Timer {
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn log(self) {
        self.log_with("");
    }

    pub fn log_with(self, extra: &str) {
        if !enabled() {
            return;
        }

        #[cfg(test)]
        LOG_COUNT.fetch_add(1, Ordering::SeqCst);

        let ms = self.start.elapsed().as_millis();
        if extra.is_empty() {
            eprintln!("PROFILE label={} ms={}", self.label, ms);
        } else {
            eprintln!("PROFILE label={} ms={} {}", self.label, ms, extra);
        }
    }
}

#[cfg(test)]
pub fn set_enabled_override(value: bool) {
    ENABLED_OVERRIDE.store(if value { 1 } else { 0 }, Ordering::SeqCst);
}

#[cfg(test)]
pub fn clear_enabled_override() {
    ENABLED_OVERRIDE.store(-1, Ordering::SeqCst);
}

#[cfg(test)]
pub fn log_count() -> usize {
    LOG_COUNT.load(Ordering::SeqCst)
}
