//! ポップアップ（UI面）の起動
//!
//! `LUNO_POPUP_CMD` に指定されたコマンドをデタッチ起動します。
//! 未設定なら opener 自体が存在しない扱いになります。
use async_trait::async_trait;

use crate::application::traits::PopupOpener;
use crate::error::{LunoError, Result};
use crate::utils::config::EnvConfig;
use crate::utils::detach::spawn_detached;

pub struct CommandPopupOpener {
    command_line: String,
}

impl CommandPopupOpener {
    pub fn new(command_line: impl Into<String>) -> Self {
        Self {
            command_line: command_line.into(),
        }
    }

    /// 環境変数にコマンドがあれば opener を返す
    pub fn from_env() -> Option<Self> {
        EnvConfig::get().popup_cmd.clone().map(Self::new)
    }
}

#[async_trait]
impl PopupOpener for CommandPopupOpener {
    async fn open(&self) -> Result<()> {
        spawn_detached(&self.command_line)
            .map(|_| ())
            .map_err(|e| {
                LunoError::SystemError(format!(
                    "failed to open popup ({}): {e}",
                    self.command_line
                ))
            })
    }
}
