// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One provisioned sandbox and the commands executed in it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use clinch_core::{ExecMode, RunRecord, RunResult, SessionId, EXIT_RUNTIME_FAILURE, EXIT_TIMEOUT};
use parking_lot::Mutex;
use tracing::Instrument;

use crate::runtime::{ContainerId, ContainerRuntime, ExecRequest};
use crate::SandboxError;

/// Lifecycle state of a [`SandboxSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Provisioning,
    Ready,
    /// At least one command is in flight.
    Executing,
    TearingDown,
    Closed,
}

clinch_core::simple_display! {
    SessionState {
        Provisioning => "provisioning",
        Ready => "ready",
        Executing => "executing",
        TearingDown => "tearing-down",
        Closed => "closed",
    }
}

/// Per-call parameters for [`SandboxSession::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOptions {
    /// Argv prefix the call's args are appended to (e.g. `["node", "cli.js"]`).
    pub program: Vec<String>,
    /// Host path under the root binding, or a path inside the sandbox.
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    pub timeout: Duration,
}

impl ExecOptions {
    pub fn new<I, S>(program: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into_iter().map(Into::into).collect(),
            cwd: None,
            env: BTreeMap::new(),
            timeout,
        }
    }

    clinch_core::setters! {
        set {
            env: BTreeMap<String, String>,
        }
        option {
            cwd: PathBuf,
        }
    }
}

struct Lifecycle {
    state: SessionState,
    in_flight: usize,
}

/// Handle to a provisioned sandbox.
///
/// Returned by [`SandboxManager::setup`](crate::SandboxManager::setup) and
/// shared by reference (usually behind an `Arc`) with every runner that
/// executes in it. Call [`teardown`](Self::teardown) when done.
pub struct SandboxSession {
    id: SessionId,
    container: ContainerId,
    runtime: Arc<dyn ContainerRuntime>,
    root_binding: PathBuf,
    workdir: String,
    image: String,
    created_at: SystemTime,
    /// Bound on teardown runtime calls.
    call_timeout: Duration,
    lifecycle: Mutex<Lifecycle>,
}

impl std::fmt::Debug for SandboxSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SandboxSession")
            .field("id", &self.id)
            .field("container", &self.container)
            .field("runtime", &self.runtime.name())
            .field("root_binding", &self.root_binding)
            .field("image", &self.image)
            .field("state", &self.state())
            .finish()
    }
}

impl SandboxSession {
    pub(crate) fn new(
        id: SessionId,
        container: ContainerId,
        runtime: Arc<dyn ContainerRuntime>,
        root_binding: PathBuf,
        workdir: String,
        image: String,
        call_timeout: Duration,
    ) -> Self {
        Self {
            id,
            container,
            runtime,
            root_binding,
            workdir,
            image,
            created_at: SystemTime::now(),
            call_timeout,
            lifecycle: Mutex::new(Lifecycle { state: SessionState::Provisioning, in_flight: 0 }),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Labels on this session's container: the toolkit label plus
    /// `clinch.session=<id>`.
    pub fn labels(&self) -> Vec<String> {
        crate::manager::session_labels(&self.id)
    }

    pub fn container_id(&self) -> &ContainerId {
        &self.container
    }

    /// Host directory bound into the sandbox.
    pub fn root_binding(&self) -> &Path {
        &self.root_binding
    }

    /// In-container path of the root binding.
    pub fn workdir(&self) -> &str {
        &self.workdir
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    pub fn state(&self) -> SessionState {
        self.lifecycle.lock().state
    }

    pub(crate) fn mark_ready(&self) {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.state == SessionState::Provisioning {
            lifecycle.state = SessionState::Ready;
        }
    }

    /// Close a session whose container was already discarded.
    pub(crate) fn mark_closed(&self) {
        self.lifecycle.lock().state = SessionState::Closed;
    }

    /// Register an in-flight execution, rejecting closed or unready sessions.
    fn begin(&self) -> Result<InFlight<'_>, SandboxError> {
        let mut lifecycle = self.lifecycle.lock();
        match lifecycle.state {
            SessionState::Ready | SessionState::Executing => {
                lifecycle.state = SessionState::Executing;
                lifecycle.in_flight += 1;
                Ok(InFlight { session: self })
            }
            SessionState::TearingDown | SessionState::Closed => {
                Err(SandboxError::SessionClosed { id: self.id.clone() })
            }
            state @ SessionState::Provisioning => {
                Err(SandboxError::NotReady { id: self.id.clone(), state })
            }
        }
    }

    /// Map a caller-supplied working directory to a path inside the sandbox.
    ///
    /// Host paths under the root binding are translated to the workdir,
    /// relative paths are joined onto it, other absolute paths pass through.
    pub fn container_path(&self, cwd: Option<&Path>) -> String {
        let Some(cwd) = cwd else {
            return self.workdir.clone();
        };
        if cwd.is_relative() {
            return join_workdir(&self.workdir, cwd);
        }
        if let Ok(rel) = cwd.strip_prefix(&self.root_binding) {
            return join_workdir(&self.workdir, rel);
        }
        if let Ok(canonical) = cwd.canonicalize() {
            if let Ok(rel) = canonical.strip_prefix(&self.root_binding) {
                return join_workdir(&self.workdir, rel);
            }
        }
        cwd.to_string_lossy().into_owned()
    }

    /// Run `program + args` inside the sandbox.
    ///
    /// Command failures, timeouts and runtime errors during the call all
    /// come back as a [`RunResult`]. Only lifecycle violations are errors.
    ///
    /// A timeout kills the local runtime client only. The process started
    /// inside the container keeps running until [`teardown`](Self::teardown)
    /// removes the container, so commands that can hang should carry their
    /// own bound (e.g. a `timeout` prefix in `program`) in long-lived sessions.
    /// The session returns to `Ready` and stays usable either way.
    pub async fn execute(
        &self,
        args: &[String],
        options: &ExecOptions,
    ) -> Result<RunResult, SandboxError> {
        let _in_flight = self.begin()?;

        let workdir = self.container_path(options.cwd.as_deref());
        let mut argv = options.program.clone();
        argv.extend(args.iter().cloned());
        let request = ExecRequest { argv, workdir: workdir.clone(), env: options.env.clone() };

        let span = tracing::info_span!("sandbox.exec", session = %self.id, workdir = %workdir);
        let start = Instant::now();
        let outcome = tokio::time::timeout(
            options.timeout,
            self.runtime.exec(&self.container, &request),
        )
        .instrument(span)
        .await;
        let duration = start.elapsed();

        let mut record = RunRecord {
            duration,
            cwd: PathBuf::from(&workdir),
            args: args.to_vec(),
            mode: ExecMode::Sandbox,
            ..RunRecord::default()
        };
        match outcome {
            Ok(Ok(output)) => {
                tracing::debug!(session = %self.id, exit_code = output.exit_code, "sandbox exec finished");
                record.exit_code = output.exit_code;
                record.stdout = output.stdout;
                record.stderr = output.stderr;
            }
            Ok(Err(e)) => {
                tracing::warn!(session = %self.id, error = %e, "sandbox exec failed");
                record.exit_code = EXIT_RUNTIME_FAILURE;
                record.stderr = format!("clinch: sandbox exec failed: {}\n", e);
            }
            Err(_) => {
                let ms = options.timeout.as_millis();
                tracing::warn!(session = %self.id, timeout_ms = ms as u64, "sandbox exec timed out");
                record.exit_code = EXIT_TIMEOUT;
                record.timed_out = true;
                record.stderr = format!("clinch: command timed out after {}ms\n", ms);
            }
        }
        Ok(record.into())
    }

    /// Remove this session's container, then sweep every toolkit container.
    ///
    /// Idempotent. Failures are logged, never returned.
    pub async fn teardown(&self) {
        {
            let mut lifecycle = self.lifecycle.lock();
            match lifecycle.state {
                SessionState::TearingDown | SessionState::Closed => return,
                _ => lifecycle.state = SessionState::TearingDown,
            }
        }
        let span = tracing::info_span!("sandbox.teardown", session = %self.id);
        async {
            tracing::info!(container = %self.container, "tearing down sandbox");
            match tokio::time::timeout(self.call_timeout, self.runtime.remove(&self.container)).await
            {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(container = %self.container, error = %e, "failed to remove sandbox container")
                }
                Err(_) => tracing::warn!(container = %self.container, "timed out removing sandbox container"),
            }
            crate::manager::sweep_labeled(self.runtime.as_ref(), self.call_timeout).await;
        }
        .instrument(span)
        .await;
        self.lifecycle.lock().state = SessionState::Closed;
        tracing::info!(session = %self.id, "sandbox closed");
    }
}

impl Drop for SandboxSession {
    fn drop(&mut self) {
        let state = self.lifecycle.get_mut().state;
        if state != SessionState::Closed {
            tracing::warn!(
                session = %self.id,
                container = %self.container,
                %state,
                "sandbox session dropped without teardown; container left for the next sweep"
            );
        }
    }
}

/// Decrements the in-flight count and returns the session to `ready`.
struct InFlight<'a> {
    session: &'a SandboxSession,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut lifecycle = self.session.lifecycle.lock();
        lifecycle.in_flight = lifecycle.in_flight.saturating_sub(1);
        if lifecycle.in_flight == 0 && lifecycle.state == SessionState::Executing {
            lifecycle.state = SessionState::Ready;
        }
    }
}

fn join_workdir(workdir: &str, rel: &Path) -> String {
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(p) => Some(p.to_string_lossy().into_owned()),
            std::path::Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        workdir.to_string()
    } else {
        format!("{}/{}", workdir.trim_end_matches('/'), parts.join("/"))
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
