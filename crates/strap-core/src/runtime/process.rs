//! External command execution with an optional deadline

use crate::error::{Error, Result};
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Lines of command output kept in a failure message
const OUTPUT_TAIL_LINES: usize = 20;

/// Run `program` to completion, capturing its output.
///
/// The child is killed if `limit` elapses first. A non-zero exit status is
/// an [`Error::CommandFailed`] carrying the tail of the command's output.
pub async fn run(
    program: &str,
    args: &[&str],
    dir: Option<&Path>,
    limit: Option<Duration>,
) -> Result<Output> {
    let command_line = std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ");

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }

    tracing::debug!(command = %command_line, dir = ?dir, "running");

    let child = cmd.output();
    let output = match limit {
        Some(limit) => timeout(limit, child).await.map_err(|_| Error::Timeout(limit))?,
        None => child.await,
    }
    .map_err(|e| Error::io("run", program, e))?;

    if !output.status.success() {
        return Err(Error::CommandFailed {
            command: command_line,
            status: output.status.to_string(),
            output: tail(&output),
        });
    }

    Ok(output)
}

/// Last lines of stderr, falling back to stdout when stderr is empty
fn tail(output: &Output) -> String {
    let stream = if output.stderr.iter().all(u8::is_ascii_whitespace) {
        &output.stdout
    } else {
        &output.stderr
    };
    let text = String::from_utf8_lossy(stream);
    let lines: Vec<&str> = text.trim_end().lines().collect();
    let start = lines.len().saturating_sub(OUTPUT_TAIL_LINES);
    lines[start..].join("\n")
}
