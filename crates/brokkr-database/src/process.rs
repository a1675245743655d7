//! Child process execution with bounded output capture

use brokkr_core::{Error, Result};
use std::io;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::debug;

/// Output of a successful child process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run `command` to completion, capturing stdout and stderr.
///
/// Either stream growing past `max_output_bytes` kills the child. Spawn
/// failures, overflow and non-zero exits all map to
/// [`Error::ProcessExecution`] carrying whatever stderr was captured.
pub async fn run_capped(
    mut command: Command,
    program: &str,
    max_output_bytes: usize,
) -> Result<CapturedOutput> {
    debug!("Running: {:?}", command.as_std());

    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .map_err(|e| Error::process(program, format!("cannot start: {}", e), ""))?;

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return Err(Error::process(program, "output pipes unavailable", ""));
    };

    let captured = tokio::try_join!(
        read_capped(stdout, max_output_bytes),
        read_capped(stderr, max_output_bytes)
    );

    let (stdout, stderr) = match captured {
        Ok(streams) => streams,
        Err(e) => {
            let _ = child.kill().await;
            return Err(Error::process(program, e.to_string(), ""));
        }
    };

    let status = child
        .wait()
        .await
        .map_err(|e| Error::process(program, format!("cannot wait: {}", e), ""))?;

    let stdout = String::from_utf8_lossy(&stdout).into_owned();
    let stderr = String::from_utf8_lossy(&stderr).into_owned();

    if !status.success() {
        let reason = match status.code() {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        };
        return Err(Error::process(program, reason, stderr));
    }

    Ok(CapturedOutput { stdout, stderr })
}

async fn read_capped<R>(reader: R, limit: usize) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    reader.take(limit as u64 + 1).read_to_end(&mut buf).await?;
    if buf.len() > limit {
        return Err(io::Error::other(format!(
            "output exceeded {} bytes",
            limit
        )));
    }
    Ok(buf)
}
