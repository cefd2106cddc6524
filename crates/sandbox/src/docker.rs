// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Docker-compatible CLI runtime.
//!
//! Drives `docker` (or any CLI with the same surface, such as `podman`) as a
//! subprocess. Containers are long-lived (`sleep infinity`) and commands run
//! in them through `docker exec`.

use std::process::Output;

use async_trait::async_trait;

use crate::runtime::{
    classify, ContainerId, ContainerRuntime, ContainerSpec, ExecOutput, ExecRequest, RuntimeError,
    RuntimeErrorKind,
};

/// [`ContainerRuntime`] backed by the docker CLI.
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: String,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new()
    }
}

impl DockerCli {
    /// Use the binary named by `CLINCH_CONTAINER_RUNTIME` (default `docker`).
    pub fn new() -> Self {
        Self { binary: crate::env::runtime_binary() }
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }

    /// Run the CLI and return its raw output.
    async fn output(&self, args: &[String]) -> Result<Output, RuntimeError> {
        tracing::debug!(binary = %self.binary, ?args, "runtime call");
        tokio::process::Command::new(&self.binary)
            .args(args)
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                let kind = if e.kind() == std::io::ErrorKind::NotFound {
                    RuntimeErrorKind::MissingBinary
                } else {
                    RuntimeErrorKind::Other
                };
                RuntimeError::new(kind, format!("failed to exec {}: {}", self.binary, e))
            })
    }

    /// Run the CLI and return trimmed stdout on success.
    async fn run(&self, args: &[String]) -> Result<String, RuntimeError> {
        let output = self.output(args).await?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let context =
                format!("{} {} failed", self.binary, args.first().map(String::as_str).unwrap_or(""));
            Err(RuntimeError::from_stderr(&context, &stderr))
        }
    }
}

/// `docker run` arguments for a sandbox container.
pub(crate) fn run_args(spec: &ContainerSpec) -> Vec<String> {
    let mut args = vec!["run".to_string(), "-d".to_string(), "--name".to_string(), spec.name.clone()];
    for label in &spec.labels {
        args.extend(["--label".to_string(), label.clone()]);
    }
    if let Some((host, target)) = &spec.bind {
        args.extend(["-v".to_string(), format!("{}:{}", host.display(), target)]);
    }
    for (key, value) in &spec.env {
        args.extend(["-e".to_string(), format!("{}={}", key, value)]);
    }
    args.extend(["-w".to_string(), spec.workdir.clone()]);
    args.push(spec.image.clone());
    args.extend(spec.command.iter().cloned());
    args
}

/// `docker exec` arguments for one command.
pub(crate) fn exec_args(container: &ContainerId, request: &ExecRequest) -> Vec<String> {
    let mut args = vec!["exec".to_string(), "-w".to_string(), request.workdir.clone()];
    for (key, value) in &request.env {
        args.extend(["-e".to_string(), format!("{}={}", key, value)]);
    }
    args.push(container.to_string());
    args.extend(request.argv.iter().cloned());
    args
}

/// Whether failed `docker exec` stderr came from the runtime rather than the command.
fn is_runtime_failure(stderr: &str) -> bool {
    let first = stderr.lines().next().unwrap_or("").trim_start();
    first.starts_with("Error response from daemon")
        || first.starts_with("Cannot connect to the Docker daemon")
        || first.starts_with("Error: No such container")
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    fn name(&self) -> &str {
        &self.binary
    }

    async fn ping(&self) -> Result<(), RuntimeError> {
        let args = ["version", "--format", "{{.Server.Version}}"].map(String::from);
        match self.run(&args).await {
            Ok(version) => {
                tracing::debug!(binary = %self.binary, %version, "runtime reachable");
                Ok(())
            }
            Err(e) if e.kind == RuntimeErrorKind::MissingBinary => Err(e),
            Err(e) => Err(RuntimeError::new(RuntimeErrorKind::Unreachable, e.message)),
        }
    }

    async fn create(&self, spec: &ContainerSpec) -> Result<ContainerId, RuntimeError> {
        let id = self.run(&run_args(spec)).await?;
        // `run -d` may print pull progress before the id
        let id = id.lines().last().unwrap_or("").trim().to_string();
        if id.is_empty() {
            return Err(RuntimeError::new(
                RuntimeErrorKind::Other,
                format!("{} run printed no container id", self.binary),
            ));
        }
        Ok(ContainerId(id))
    }

    async fn exec(
        &self,
        container: &ContainerId,
        request: &ExecRequest,
    ) -> Result<ExecOutput, RuntimeError> {
        let output = self.output(&exec_args(container, request)).await?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() && is_runtime_failure(&stderr) {
            return Err(RuntimeError::new(
                classify(&stderr),
                format!("{} exec in {} failed: {}", self.binary, container, stderr.trim()),
            ));
        }
        Ok(ExecOutput { exit_code: output.status.code().unwrap_or(-1), stdout, stderr })
    }

    async fn remove(&self, container: &ContainerId) -> Result<(), RuntimeError> {
        let args = ["rm", "-f", container.as_str()].map(String::from);
        match self.run(&args).await {
            Ok(_) => Ok(()),
            Err(e) if e.message.contains("No such container") => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn list_labeled(&self, label: &str) -> Result<Vec<ContainerId>, RuntimeError> {
        let filter = format!("label={}", label);
        let args = ["ps", "-aq", "--filter", filter.as_str()].map(String::from);
        let out = self.run(&args).await?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(ContainerId::new)
            .collect())
    }
}

#[cfg(test)]
#[path = "docker_tests.rs"]
mod tests;
