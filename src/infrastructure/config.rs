//! データディレクトリと実行時設定の解決
use crate::application::service_container::AppConfig;
use crate::utils::config::EnvConfig;
use directories::ProjectDirs;
use std::{fs, io, path::PathBuf, time::Duration};

/// データディレクトリを返す（無ければ作成）
///
/// `LUNO_DATA_DIR` > `$XDG_DATA_HOME/luno` > プラットフォーム標準の順に解決します。
pub fn data_dir() -> io::Result<PathBuf> {
    let config = EnvConfig::get();
    let dir = if let Some(dir) = &config.data_dir {
        PathBuf::from(dir)
    } else if let Some(xdg_data_home) = &config.xdg_data_home {
        PathBuf::from(xdg_data_home).join("luno")
    } else {
        ProjectDirs::from("com", "user", "luno")
            .ok_or_else(|| io::Error::other("cannot resolve platform dirs"))?
            .data_local_dir()
            .to_path_buf()
    };
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// 環境変数の上書きを反映した AppConfig を作成
pub fn app_config_from_env() -> AppConfig {
    let env = EnvConfig::get();
    let mut config = AppConfig::default();
    if let Some(url) = &env.api_base_url {
        config.api_base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(ms) = env.lookup_timeout_ms {
        config.lookup_timeout = Duration::from_millis(ms);
    }
    config
}
