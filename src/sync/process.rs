//! Time-boxed external process execution

use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::error::{Result, SyncError};

/// Longest stderr tail kept in error messages
const STDERR_TAIL: usize = 512;

fn tool_name(program: &Path) -> String {
    program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string())
}

/// Run `program` with `args`, killing it if it outlives `timeout`.
///
/// A missing or non-executable binary is `ToolUnavailable`; a non-zero
/// exit is `ToolFailure`; overrunning the deadline is `Timeout` and the
/// child is killed and reaped before returning.
pub async fn run_tool<I, S>(program: &Path, args: I, timeout: Duration) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let tool = tool_name(program);
    let started = Instant::now();

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                SyncError::ToolUnavailable { tool: tool.clone() }
            }
            _ => SyncError::Io(e),
        })?;

    let stderr = child.stderr.take();
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut pipe) = stderr {
            let _ = pipe.read_to_end(&mut buf).await;
        }
        buf
    });

    let status = match tokio::time::timeout(timeout, child.wait()).await {
        Ok(status) => status?,
        Err(_) => {
            tracing::warn!(tool = %tool, "Timed out after {:?}, killing", timeout);
            let _ = child.start_kill();
            let _ = child.wait().await;
            stderr_task.abort();
            return Err(SyncError::Timeout {
                tool,
                secs: timeout.as_secs(),
            });
        }
    };

    let stderr = stderr_task.await.unwrap_or_default();
    tracing::debug!(
        tool = %tool,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Process exited with {}",
        status
    );

    if !status.success() {
        return Err(SyncError::ToolFailure {
            tool,
            reason: format!("exited with {}: {}", status, stderr_tail(&stderr)),
        });
    }
    Ok(())
}

/// Fail unless `path` exists and is non-empty
pub async fn require_output(tool: &str, path: &Path) -> Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(()),
        Ok(_) => Err(SyncError::ToolFailure {
            tool: tool.to_string(),
            reason: format!("output {} is empty", path.display()),
        }),
        Err(_) => Err(SyncError::ToolFailure {
            tool: tool.to_string(),
            reason: format!("output {} was not created", path.display()),
        }),
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    let start = text
        .char_indices()
        .rev()
        .nth(STDERR_TAIL - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    text[start..].to_string()
}
