//! Running external tools (tesseract, pdftoppm, pdfinfo) with a deadline.

use crate::{FolioError, Result};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::{Duration, timeout};

/// Run `command` to completion and return its stdout.
///
/// `input`, when given, is written to the child's stdin. A child that fails to
/// start is an IO error; everything after that (timeout, non-zero exit) is
/// reported through `failure` so callers can attach their own error kind.
/// The child is killed if the returned future is dropped.
pub(crate) async fn run_tool<F>(
    mut command: Command,
    tool: &str,
    input: Option<Vec<u8>>,
    timeout_secs: u64,
    failure: F,
) -> Result<Vec<u8>>
where
    F: Fn(String) -> FolioError,
{
    command
        .stdin(if input.is_some() { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .map_err(|e| std::io::Error::other(format!("Failed to execute {}: {}", tool, e)))?;

    if let Some(bytes) = input
        && let Some(mut stdin) = child.stdin.take()
    {
        // Fed from a separate task so a chatty child cannot deadlock on a full stdout pipe.
        tokio::spawn(async move {
            if let Err(e) = stdin.write_all(&bytes).await {
                tracing::debug!("stdin closed early: {}", e);
            }
        });
    }

    let output = match timeout(Duration::from_secs(timeout_secs), child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => return Err(std::io::Error::other(format!("Failed to wait for {}: {}", tool, e)).into()),
        Err(_) => {
            return Err(failure(format!("{} timed out after {} seconds", tool, timeout_secs)));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(failure(format!(
            "{} exited with code {}: {}",
            tool,
            output.status.code().unwrap_or(-1),
            stderr.trim()
        )));
    }

    Ok(output.stdout)
}
