//! luno CLI: 検索結果・履歴・設定を表示する UI 面と、`lunod` デーモンの簡易コントローラ。
//! 検索は `ipc::send_cmd` でデーモンへ委譲し、履歴・設定は共有ストレージを直接操作します。
mod cli;

use clap::Parser;
use cli::{Cli, Cmd, HistoryCmd, SettingsCmd};
use luno::{
    application::ServiceContainer,
    domain::{DefinitionRequestState, HistoryEntry, RequestPhase, SettingUpdate, SettingsState},
    ipc::{IpcCmd, IpcResp, send_cmd, watch_states},
    utils::{config::EnvConfig, env::load_env},
};

/// ポップアップに表示する最近の履歴件数
const POPUP_HISTORY_ITEMS: usize = 5;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_env();
    EnvConfig::init();

    let cli = Cli::parse();

    match cli.cmd.unwrap_or(Cmd::Popup) {
        Cmd::Search { word } => print_lookup(send_cmd(&IpcCmd::SearchWord { word })?),
        Cmd::Select { text } => {
            print_lookup(send_cmd(&IpcCmd::ContextMenu { selection: text })?)
        }
        Cmd::Status => print_lookup(send_cmd(&IpcCmd::Status)?),
        Cmd::Health => {
            let resp = send_cmd(&IpcCmd::Health)?;
            if resp.ok {
                println!("{}", resp.msg);
            } else {
                eprintln!("Error: {}", resp.msg);
            }
        }
        Cmd::Watch => watch_states(|state| {
            match state {
                Some(state) => println!("{}", render_state(&state)),
                None => println!("(no lookup yet)"),
            }
            true
        })?,
        Cmd::Popup => run_local(popup)?,
        Cmd::History { action } => run_local(|c| history(c, action))?,
        Cmd::Settings { action } => run_local(|c| settings(c, action))?,
    }
    Ok(())
}

/// 共有ストレージを直接扱う処理を current-thread ランタイムで実行
fn run_local<F, Fut>(f: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(ServiceContainer) -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    let container = ServiceContainer::new()?;
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(f(container));
    Ok(())
}

fn print_lookup(resp: IpcResp) {
    if !resp.ok {
        eprintln!("Error: {}", resp.msg);
        return;
    }
    match resp.request_state() {
        Some(state) => println!("{}", render_state(&state)),
        None => println!("(no lookup yet)"),
    }
}

async fn popup(container: ServiceContainer) {
    if container.splash.should_show().await {
        println!("🌙 Luno – quick definitions\n");
    }
    container.splash.record_open().await;

    match container.orchestrator.current_state().await {
        Some(state) => println!("{}", render_state(&state)),
        None => println!("Highlight a word and choose \"Luno\", or run `luno search <word>`."),
    }

    let entries = container.history.list().await;
    if !entries.is_empty() {
        println!("\nRecent:");
        for entry in entries.iter().take(POPUP_HISTORY_ITEMS) {
            println!("  {}", render_history_entry(entry));
        }
    }

    let settings = container.settings.get().await;
    println!("\n{}", render_settings(&settings));
}

async fn history(container: ServiceContainer, action: HistoryCmd) {
    let entries = match action {
        HistoryCmd::List => container.history.list().await,
        HistoryCmd::Remove { word } => container.history.remove(&word).await,
        HistoryCmd::Clear => {
            container.history.clear().await;
            println!("✅ History cleared.");
            return;
        }
    };

    if entries.is_empty() {
        println!("📝 No lookups yet.");
        return;
    }
    println!("📚 {} word(s):", entries.len());
    for entry in &entries {
        println!("  {}", render_history_entry(entry));
    }
}

async fn settings(container: ServiceContainer, action: SettingsCmd) {
    let settings = match action {
        SettingsCmd::Show => container.settings.get().await,
        SettingsCmd::Theme { theme } => {
            container.settings.update(SettingUpdate::Theme(theme)).await
        }
        SettingsCmd::Shortcut { label } => {
            container
                .settings
                .update(SettingUpdate::Shortcut(label))
                .await
        }
    };
    println!("{}", render_settings(&settings));
}

fn render_state(state: &DefinitionRequestState) -> String {
    match state.phase() {
        RequestPhase::Idle => "(no lookup yet)".to_string(),
        RequestPhase::Loading => format!(
            "⏳ Looking up \"{}\"...",
            state.requested_word.as_deref().unwrap_or_default()
        ),
        RequestPhase::Error => format!("❌ {}", state.error.as_deref().unwrap_or_default()),
        RequestPhase::Success => {
            let Some(def) = &state.data else {
                return String::new();
            };
            let mut out = def.word.clone();
            if let Some(phonetic) = &def.phonetic {
                out.push_str(&format!("  {phonetic}"));
            }
            for meaning in &def.meanings {
                out.push_str(&format!("\n\n  {}", meaning.part_of_speech));
                for (i, item) in meaning.definitions.iter().enumerate() {
                    out.push_str(&format!("\n   {}. {}", i + 1, item.definition));
                    if let Some(example) = &item.example {
                        out.push_str(&format!("\n      \"{example}\""));
                    }
                }
            }
            out
        }
    }
}

fn render_history_entry(entry: &HistoryEntry) -> String {
    let when = chrono::DateTime::from_timestamp_millis(entry.timestamp)
        .map(|t| {
            t.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| "-".into());
    format!("{} (×{}, {})", entry.word, entry.count, when)
}

fn render_settings(settings: &SettingsState) -> String {
    format!("theme={} shortcut={}", settings.theme, settings.shortcut)
}
