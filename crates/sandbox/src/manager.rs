// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sandbox provisioning, health checking and bulk cleanup.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use clinch_core::{SessionId, ValidationError};
use tracing::Instrument;

use crate::error::{SetupStage, UnavailableCause};
use crate::runtime::{
    ContainerId, ContainerRuntime, ContainerSpec, ExecRequest, RuntimeError, RuntimeErrorKind,
};
use crate::{DockerCli, SandboxError, SandboxOptions, SandboxSession};

/// Label carried by every container this toolkit creates.
pub const MANAGED_LABEL: &str = "clinch.managed=true";
/// Label key carrying the owning session id.
pub const SESSION_LABEL_KEY: &str = "clinch.session";
/// Prefix of container names.
pub const CONTAINER_PREFIX: &str = "clinch-";

/// Labels put on the container of session `id`.
pub(crate) fn session_labels(id: &SessionId) -> Vec<String> {
    vec![MANAGED_LABEL.to_string(), format!("{}={}", SESSION_LABEL_KEY, id)]
}

/// Provisions [`SandboxSession`]s on a container runtime.
#[derive(Clone)]
pub struct SandboxManager {
    runtime: Arc<dyn ContainerRuntime>,
}

impl SandboxManager {
    pub fn new(runtime: impl ContainerRuntime) -> Self {
        Self { runtime: Arc::new(runtime) }
    }

    pub fn from_arc(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { runtime }
    }

    /// Manager for the docker CLI named by the environment.
    pub fn docker() -> Self {
        Self::new(DockerCli::new())
    }

    pub fn runtime(&self) -> &Arc<dyn ContainerRuntime> {
        &self.runtime
    }

    /// Provision a sandbox and wait until it passes its health probe.
    ///
    /// The runtime is pinged before anything is created so an absent runtime
    /// surfaces as [`SandboxError::RuntimeUnavailable`], never as a
    /// provisioning failure.
    pub async fn setup(&self, options: SandboxOptions) -> Result<SandboxSession, SandboxError> {
        options.validate()?;
        let span = tracing::info_span!(
            "sandbox.setup",
            runtime = self.runtime.name(),
            image = %options.image,
            root = %options.root_dir.display(),
        );
        self.setup_inner(options).instrument(span).await
    }

    async fn setup_inner(&self, options: SandboxOptions) -> Result<SandboxSession, SandboxError> {
        let timeout = options.timeout;

        if let Err(e) = bounded(timeout, "runtime ping", self.runtime.ping()).await {
            tracing::info!(error = %e, "container runtime unavailable");
            return Err(SandboxError::RuntimeUnavailable {
                runtime: self.runtime.name().to_string(),
                reason: e.to_string(),
            });
        }

        let root = options.root_dir.canonicalize().map_err(|e| ValidationError::Invalid {
            field: "root_dir",
            reason: format!("{}: {}", options.root_dir.display(), e),
        })?;

        let id = SessionId::new();
        let name = format!("{}{}", CONTAINER_PREFIX, id);
        let spec = ContainerSpec {
            name: name.clone(),
            image: options.image.clone(),
            labels: session_labels(&id),
            bind: Some((root.clone(), options.workdir.clone())),
            workdir: options.workdir.clone(),
            env: options.env.clone(),
            command: vec!["sleep".to_string(), "infinity".to_string()],
        };
        let unavailable = |cause: UnavailableCause,
                           stage: SetupStage,
                           attempts: u32,
                           last_error: RuntimeError| SandboxError::Unavailable {
            cause,
            stage,
            image: options.image.clone(),
            root_dir: root.clone(),
            attempts,
            last_error,
        };

        // Provision
        let mut attempt = 0;
        let container = loop {
            attempt += 1;
            let err = match bounded(timeout, "container create", self.runtime.create(&spec)).await {
                Ok(container) => break container,
                Err(e) => e,
            };
            // A failed `run` can still leave a container holding the name
            self.discard(&ContainerId::new(&name), timeout).await;
            if !err.kind.is_transient() || !options.backoff.allows_retry(attempt) {
                tracing::warn!(attempt, error = %err, "sandbox provisioning failed");
                return Err(unavailable(err.kind.into(), SetupStage::Provision, attempt, err));
            }
            let delay = options.backoff.delay_after(attempt);
            tracing::warn!(attempt, delay_ms = delay.as_millis() as u64, error = %err, "provisioning failed, retrying");
            tokio::time::sleep(delay).await;
        };
        tracing::info!(session = %id, %container, "sandbox container created");

        let session = SandboxSession::new(
            id,
            container.clone(),
            Arc::clone(&self.runtime),
            root.clone(),
            options.workdir.clone(),
            options.image.clone(),
            timeout,
        );

        // Health check
        let probe = ExecRequest {
            argv: options.health_probe.clone(),
            workdir: options.workdir.clone(),
            env: Default::default(),
        };
        let mut attempt = 0;
        loop {
            attempt += 1;
            let err = match bounded(timeout, "health probe", self.runtime.exec(&container, &probe)).await {
                Ok(output) if output.exit_code == 0 => break,
                Ok(output) => RuntimeError::new(
                    RuntimeErrorKind::Other,
                    format!(
                        "health probe `{}` exited {}: {}",
                        probe.argv.join(" "),
                        output.exit_code,
                        output.stderr.trim()
                    ),
                ),
                Err(e) => e,
            };
            if !err.kind.is_transient() || !options.backoff.allows_retry(attempt) {
                tracing::warn!(attempt, error = %err, "sandbox health check failed");
                self.discard(&container, timeout).await;
                session.mark_closed();
                return Err(unavailable(health_cause(err.kind), SetupStage::HealthCheck, attempt, err));
            }
            let delay = options.backoff.delay_after(attempt);
            tracing::warn!(attempt, delay_ms = delay.as_millis() as u64, error = %err, "health probe failed, retrying");
            tokio::time::sleep(delay).await;
        }

        session.mark_ready();
        tracing::info!(session = %session.id(), "sandbox ready");
        Ok(session)
    }

    /// Remove every toolkit-labeled container, returning how many were removed.
    ///
    /// Needs no session. Failures are logged, not returned.
    pub async fn sweep(&self) -> usize {
        sweep_labeled(self.runtime.as_ref(), crate::DEFAULT_SETUP_TIMEOUT).await
    }

    async fn discard(&self, container: &ContainerId, timeout: Duration) {
        if let Err(e) = bounded(timeout, "container remove", self.runtime.remove(container)).await {
            tracing::debug!(%container, error = %e, "discard failed");
        }
    }
}

/// Remove all containers carrying [`MANAGED_LABEL`].
pub async fn sweep_labeled(runtime: &dyn ContainerRuntime, timeout: Duration) -> usize {
    let containers =
        match bounded(timeout, "container list", runtime.list_labeled(MANAGED_LABEL)).await {
            Ok(containers) => containers,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list sandbox containers");
                return 0;
            }
        };
    let mut removed = 0;
    for container in &containers {
        match bounded(timeout, "container remove", runtime.remove(container)).await {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!(%container, error = %e, "failed to remove sandbox container"),
        }
    }
    if removed > 0 {
        tracing::info!(removed, "swept sandbox containers");
    }
    removed
}

/// Health check failures without a more specific cause are reported as such.
fn health_cause(kind: RuntimeErrorKind) -> UnavailableCause {
    match UnavailableCause::from(kind) {
        UnavailableCause::Unknown => UnavailableCause::HealthCheckFailed,
        cause => cause,
    }
}

/// Bound a runtime call by `timeout`.
async fn bounded<T>(
    timeout: Duration,
    what: &str,
    call: impl Future<Output = Result<T, RuntimeError>>,
) -> Result<T, RuntimeError> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(RuntimeError::timeout(what, timeout.as_millis())),
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
