use clap::{Parser, Subcommand};
use luno::domain::Theme;

#[derive(Parser)]
#[command(author, version, about = "Luno dictionary client (daemon control + history + settings)")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Cmd>,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// 単語を検索
    Search { word: String },
    /// 選択テキストから検索（コンテキストメニュー相当）
    Select {
        #[arg(default_value = "")]
        text: String,
    },
    /// 現在の検索状態を表示
    Status,
    /// 検索状態の変化を表示し続ける
    Watch,
    /// デーモンのヘルスチェック
    Health,
    /// ポップアップ表示（スプラッシュ + 状態 + 最近の履歴）
    Popup,
    /// 📚 履歴操作
    History {
        #[command(subcommand)]
        action: HistoryCmd,
    },
    /// 各種設定操作
    Settings {
        #[command(subcommand)]
        action: SettingsCmd,
    },
}

#[derive(Subcommand)]
pub enum HistoryCmd {
    /// 一覧表示
    List,
    /// 削除
    Remove { word: String },
    /// 全消去
    Clear,
}

#[derive(Subcommand)]
pub enum SettingsCmd {
    /// 現在の設定を表示
    Show,
    /// テーマを変更 (auto / dark / light)
    Theme { theme: Theme },
    /// ショートカット表示ラベルを変更
    Shortcut { label: String },
}
