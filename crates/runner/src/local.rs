// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local subprocess execution.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clinch_core::{
    ExecMode, RunRecord, RunResult, EXIT_NOT_EXECUTABLE, EXIT_NOT_FOUND, EXIT_RUNTIME_FAILURE,
    EXIT_TIMEOUT,
};
use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;

/// How long to keep draining pipes after the process itself exited.
///
/// Grandchildren that inherited the pipes can hold them open indefinitely.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// One local invocation, fully resolved.
pub(crate) struct LocalCommand<'a> {
    pub program: &'a [String],
    pub args: &'a [String],
    pub cwd: PathBuf,
    pub env: &'a BTreeMap<String, String>,
    pub timeout: Duration,
}

/// Spawn the command and capture its outcome.
///
/// Never fails: spawn errors and timeouts are folded into the result.
pub(crate) async fn run(cmd: LocalCommand<'_>) -> RunResult {
    let start = Instant::now();
    let mut record = RunRecord {
        cwd: cmd.cwd.clone(),
        args: cmd.args.to_vec(),
        mode: ExecMode::Local,
        ..RunRecord::default()
    };

    let (exe, prefix) = match cmd.program.split_first() {
        Some(split) => split,
        None => {
            record.exit_code = EXIT_RUNTIME_FAILURE;
            record.stderr = "clinch: no program configured\n".to_string();
            return record.into();
        }
    };

    let mut process = tokio::process::Command::new(exe);
    process
        .args(prefix)
        .args(cmd.args)
        .current_dir(&cmd.cwd)
        .envs(cmd.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = match process.spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::debug!(program = %exe, error = %e, "spawn failed");
            record.exit_code = match e.kind() {
                std::io::ErrorKind::NotFound => EXIT_NOT_FOUND,
                std::io::ErrorKind::PermissionDenied => EXIT_NOT_EXECUTABLE,
                _ => EXIT_RUNTIME_FAILURE,
            };
            record.stderr = format!("clinch: failed to spawn {}: {}\n", exe, e);
            record.duration = start.elapsed();
            return record.into();
        }
    };

    let (stdout_buf, stdout_task) = drain(child.stdout.take());
    let (stderr_buf, stderr_task) = drain(child.stderr.take());

    let status = match tokio::time::timeout(cmd.timeout, child.wait()).await {
        Ok(status) => status,
        Err(_) => {
            record.timed_out = true;
            if let Err(e) = child.kill().await {
                tracing::warn!(program = %exe, error = %e, "failed to kill timed out command");
            }
            child.wait().await
        }
    };

    // Output still flowing from grandchildren is bounded by the run's timeout
    let grace = if record.timed_out {
        DRAIN_GRACE
    } else {
        cmd.timeout.saturating_sub(start.elapsed()).max(DRAIN_GRACE)
    };
    settle(stdout_task, grace).await;
    settle(stderr_task, grace).await;
    record.duration = start.elapsed();
    record.stdout = take_lossy(&stdout_buf);
    record.stderr = take_lossy(&stderr_buf);

    if record.timed_out {
        record.exit_code = EXIT_TIMEOUT;
        record.stderr.push_str(&format!(
            "clinch: command timed out after {}ms\n",
            cmd.timeout.as_millis()
        ));
        return record.into();
    }

    match status {
        Ok(status) => record.exit_code = exit_code(status),
        Err(e) => {
            record.exit_code = EXIT_RUNTIME_FAILURE;
            record.stderr.push_str(&format!("clinch: failed to wait for {}: {}\n", exe, e));
        }
    }
    record.into()
}

type Buffer = Arc<Mutex<Vec<u8>>>;

/// Read a pipe to EOF on a background task, keeping what was read so far
/// available even if the task is abandoned.
fn drain<R>(pipe: Option<R>) -> (Buffer, Option<JoinHandle<()>>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let buffer: Buffer = Arc::default();
    let task = pipe.map(|mut pipe| {
        let buffer = Arc::clone(&buffer);
        tokio::spawn(async move {
            let mut chunk = [0u8; 8192];
            loop {
                match pipe.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => buffer.lock().extend_from_slice(&chunk[..n]),
                }
            }
        })
    });
    (buffer, task)
}

/// Wait for a drain task, abandoning it after `grace`.
async fn settle(task: Option<JoinHandle<()>>, grace: Duration) {
    let Some(mut task) = task else {
        return;
    };
    if tokio::time::timeout(grace, &mut task).await.is_err() {
        task.abort();
    }
}

fn take_lossy(buffer: &Buffer) -> String {
    String::from_utf8_lossy(&std::mem::take(&mut *buffer.lock())).into_owned()
}

/// Exit code, or `128 + signal` when the process was killed by a signal.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    EXIT_RUNTIME_FAILURE
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
