use std::io;
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tokio::task::JoinHandle;

/// コマンドライン文字列を空白で分割し、子プロセスとして起動する
///
/// 呼び出し元は終了を待たない。子プロセスは裏のタスクが `wait` して回収する
/// （返り値の `JoinHandle` で終了ステータスを受け取れる）。
/// tokio ランタイム内から呼ぶこと。空文字列は `InvalidInput`。
pub fn spawn_detached(command_line: &str) -> io::Result<JoinHandle<Option<ExitStatus>>> {
    let mut parts = command_line.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command line"))?;

    let mut child = Command::new(program)
        .args(parts)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    let label = program.to_string();
    Ok(tokio::spawn(async move {
        match child.wait().await {
            Ok(status) => Some(status),
            Err(e) => {
                eprintln!("failed to reap detached process ({label}): {e}");
                None
            }
        }
    }))
}
