// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory container runtime for tests.

use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::runtime::{
    ContainerId, ContainerRuntime, ContainerSpec, ExecOutput, ExecRequest, RuntimeError,
    RuntimeErrorKind,
};

/// Recorded call to the fake runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
    Ping,
    Create { name: String, image: String, labels: Vec<String> },
    Exec { container: ContainerId, argv: Vec<String>, workdir: String },
    Remove { container: ContainerId },
    ListLabeled { label: String },
}

#[derive(Default)]
struct FakeState {
    unreachable: Option<String>,
    create_failures: VecDeque<RuntimeError>,
    exec_results: VecDeque<Result<ExecOutput, RuntimeError>>,
    exec_delay: Option<Duration>,
    remove_failures: VecDeque<RuntimeError>,
    /// Live containers with their labels.
    containers: Vec<(ContainerId, Vec<String>)>,
    calls: Vec<RuntimeCall>,
    next_id: u32,
}

/// Fake [`ContainerRuntime`] with scripted failures and recorded calls.
///
/// Unscripted `exec` calls echo their argv (space-joined) to stdout and exit 0.
#[derive(Clone, Default)]
pub struct FakeRuntime {
    inner: Arc<Mutex<FakeState>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `ping` fail as if the daemon were down.
    pub fn set_unreachable(&self, reason: impl Into<String>) {
        self.inner.lock().unreachable = Some(reason.into());
    }

    /// Fail the next `create` with this error (queued, FIFO).
    pub fn fail_next_create(&self, kind: RuntimeErrorKind, message: impl Into<String>) {
        self.inner.lock().create_failures.push_back(RuntimeError::new(kind, message));
    }

    /// Return this output from the next `exec` (queued, FIFO).
    pub fn push_exec(&self, exit_code: i32, stdout: &str, stderr: &str) {
        self.inner.lock().exec_results.push_back(Ok(ExecOutput {
            exit_code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }));
    }

    /// Fail the next `exec` with this error (queued, FIFO).
    pub fn fail_next_exec(&self, kind: RuntimeErrorKind, message: impl Into<String>) {
        self.inner.lock().exec_results.push_back(Err(RuntimeError::new(kind, message)));
    }

    /// Sleep this long in every `exec`.
    pub fn set_exec_delay(&self, delay: Duration) {
        self.inner.lock().exec_delay = Some(delay);
    }

    /// Fail the next `remove` with this error (queued, FIFO).
    pub fn fail_next_remove(&self, kind: RuntimeErrorKind, message: impl Into<String>) {
        self.inner.lock().remove_failures.push_back(RuntimeError::new(kind, message));
    }

    /// Add a container as if left behind by an earlier run.
    pub fn seed_container(&self, id: &str, labels: &[&str]) {
        self.inner
            .lock()
            .containers
            .push((ContainerId::new(id), labels.iter().map(|l| l.to_string()).collect()));
    }

    /// Ids of live containers.
    pub fn containers(&self) -> Vec<ContainerId> {
        self.inner.lock().containers.iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.inner.lock().calls.clone()
    }

    pub fn create_calls(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, RuntimeCall::Create { .. })).count()
    }

    pub fn exec_calls(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                RuntimeCall::Exec { argv, .. } => Some(argv),
                _ => None,
            })
            .collect()
    }

    pub fn removed(&self) -> BTreeSet<ContainerId> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                RuntimeCall::Remove { container } => Some(container),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    fn name(&self) -> &str {
        "fake"
    }

    async fn ping(&self) -> Result<(), RuntimeError> {
        let mut state = self.inner.lock();
        state.calls.push(RuntimeCall::Ping);
        match &state.unreachable {
            Some(reason) => Err(RuntimeError::new(RuntimeErrorKind::Unreachable, reason.clone())),
            None => Ok(()),
        }
    }

    async fn create(&self, spec: &ContainerSpec) -> Result<ContainerId, RuntimeError> {
        let mut state = self.inner.lock();
        state.calls.push(RuntimeCall::Create {
            name: spec.name.clone(),
            image: spec.image.clone(),
            labels: spec.labels.clone(),
        });
        if let Some(err) = state.create_failures.pop_front() {
            return Err(err);
        }
        state.next_id += 1;
        let id = ContainerId::new(format!("fake-{}", state.next_id));
        state.containers.push((id.clone(), spec.labels.clone()));
        Ok(id)
    }

    async fn exec(
        &self,
        container: &ContainerId,
        request: &ExecRequest,
    ) -> Result<ExecOutput, RuntimeError> {
        let (delay, scripted, exists) = {
            let mut state = self.inner.lock();
            state.calls.push(RuntimeCall::Exec {
                container: container.clone(),
                argv: request.argv.clone(),
                workdir: request.workdir.clone(),
            });
            let exists = state.containers.iter().any(|(id, _)| id == container);
            (state.exec_delay, state.exec_results.pop_front(), exists)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(result) = scripted {
            return result;
        }
        if !exists {
            return Err(RuntimeError::new(
                RuntimeErrorKind::Other,
                format!("Error response from daemon: No such container: {}", container),
            ));
        }
        Ok(ExecOutput { exit_code: 0, stdout: format!("{}\n", request.argv.join(" ")), stderr: String::new() })
    }

    async fn remove(&self, container: &ContainerId) -> Result<(), RuntimeError> {
        let mut state = self.inner.lock();
        state.calls.push(RuntimeCall::Remove { container: container.clone() });
        if let Some(err) = state.remove_failures.pop_front() {
            return Err(err);
        }
        state.containers.retain(|(id, _)| id != container);
        Ok(())
    }

    async fn list_labeled(&self, label: &str) -> Result<Vec<ContainerId>, RuntimeError> {
        let mut state = self.inner.lock();
        state.calls.push(RuntimeCall::ListLabeled { label: label.to_string() });
        Ok(state
            .containers
            .iter()
            .filter(|(_, labels)| labels.iter().any(|l| l == label))
            .map(|(id, _)| id.clone())
            .collect())
    }
}
