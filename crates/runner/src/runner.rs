// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::sync::Arc;

use clinch_core::{ExecMode, RunOptions, RunResult};
use clinch_sandbox::{ExecOptions, SandboxSession};
use tracing::Instrument;

use crate::local::{self, LocalCommand};
use crate::{RunError, RunnerConfig};

/// Executes the target CLI locally or in an attached sandbox.
///
/// Holds no mutable state: clones and concurrent calls are independent.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    config: RunnerConfig,
    session: Option<Arc<SandboxSession>>,
}

impl CommandRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config, session: None }
    }

    /// Attach the sandbox session used by sandbox-mode runs.
    pub fn with_session(mut self, session: Arc<SandboxSession>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&Arc<SandboxSession>> {
        self.session.as_ref()
    }

    /// Run in the mode named by `options.mode`.
    pub async fn run(&self, options: &RunOptions) -> Result<RunResult, RunError> {
        match options.mode {
            ExecMode::Local => self.run_local(options).await,
            ExecMode::Sandbox => self.run_sandbox(options).await,
        }
    }

    /// Run locally with default options.
    pub async fn run_args<I, S>(&self, args: I) -> Result<RunResult, RunError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run_local(&RunOptions::new(args)).await
    }

    /// Run as a local subprocess, whatever `options.mode` says.
    pub async fn run_local(&self, options: &RunOptions) -> Result<RunResult, RunError> {
        let options = options.clone().mode(ExecMode::Local);
        options.validate()?;
        self.config.validate()?;

        let program = self.config.local_program();
        let cwd = match &options.cwd {
            Some(cwd) => cwd.clone(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };
        let timeout = options.timeout_or(self.config.default_timeout);
        let span = tracing::info_span!(
            "runner.run",
            mode = "local",
            program = %program.join(" "),
            exit_code = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        );
        tracing::debug!(parent: &span, args = ?options.args, cwd = %cwd.display(), "running command");

        let result = local::run(LocalCommand {
            program: &program,
            args: &options.args,
            cwd,
            env: &options.env,
            timeout,
        })
        .instrument(span.clone())
        .await;

        span.record("exit_code", result.exit_code());
        span.record("duration_ms", result.duration_ms());
        Ok(result)
    }

    /// Run in the attached sandbox session.
    ///
    /// Without a session this fails with [`RunError::NoSandboxSession`];
    /// there is no fallback to local execution.
    pub async fn run_sandbox(&self, options: &RunOptions) -> Result<RunResult, RunError> {
        let options = options.clone().mode(ExecMode::Sandbox);
        options.validate()?;
        self.config.validate()?;

        let Some(session) = &self.session else {
            return Err(RunError::NoSandboxSession { command: options.args.join(" ") });
        };
        let exec = ExecOptions {
            program: self.config.sandbox_program.clone(),
            cwd: options.cwd.clone(),
            env: options.env.clone(),
            timeout: options.timeout_or(self.config.default_timeout),
        };
        let span = tracing::info_span!(
            "runner.run",
            mode = "sandbox",
            session = %session.id(),
            exit_code = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        );
        tracing::debug!(parent: &span, args = ?options.args, "running command");

        let result = session.execute(&options.args, &exec).instrument(span.clone()).await?;

        span.record("exit_code", result.exit_code());
        span.record("duration_ms", result.duration_ms());
        Ok(result)
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
