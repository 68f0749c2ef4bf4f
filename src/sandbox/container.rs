use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::types::RuntimeConfig;
use crate::error::{Result, RunboxError};
use crate::sandbox::runner::{CaptureMode, ProcessRunner, SystemRunner};
use crate::sandbox::{ExecutionLimits, ProcessResult};

/// Keeps an otherwise idle container alive until it is killed.
const KEEPALIVE_COMMAND: [&str; 3] = ["tail", "-f", "/dev/null"];

/// Handle to a docker-compatible container CLI.
#[derive(Clone)]
pub struct ContainerRuntime {
    runner: Arc<dyn ProcessRunner>,
    binary: String,
    workdir: String,
}

impl ContainerRuntime {
    pub fn new(runner: Arc<dyn ProcessRunner>, binary: &str, workdir: &str) -> Self {
        Self {
            runner,
            binary: binary.to_string(),
            workdir: workdir.to_string(),
        }
    }

    /// Resolve the configured binary on `PATH` and drive it with real processes.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self> {
        let binary = which::which(&config.binary).map_err(|_| RunboxError::RuntimeNotFound {
            binary: config.binary.clone(),
        })?;
        debug!(binary = %binary.display(), "Resolved container runtime");

        Ok(Self::new(
            Arc::new(SystemRunner),
            &binary.to_string_lossy(),
            &config.workdir,
        ))
    }

    /// Directory inside every container where sources are placed and run.
    pub fn workdir(&self) -> &str {
        &self.workdir
    }

    async fn invoke(&self, args: Vec<String>, mode: CaptureMode) -> Result<ProcessResult> {
        self.runner.run(&self.binary, &args, mode).await
    }
}

/// Lifecycle of a [`SandboxContainer`]. `Destroyed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Created,
    InUse,
    Destroyed,
}

/// One ephemeral, network-isolated container serving a single job.
///
/// All operations take `&mut self`, so commands against one container are
/// strictly sequential. The owner must call [`SandboxContainer::destroy`] on
/// every path; dropping a live container only schedules a best-effort removal.
pub struct SandboxContainer {
    id: String,
    runtime: ContainerRuntime,
    state: ContainerState,
}

impl SandboxContainer {
    /// Launch a detached container from `image` capped by `limits`.
    pub async fn create(
        runtime: &ContainerRuntime,
        image: &str,
        limits: &ExecutionLimits,
    ) -> Result<Self> {
        info!(image = %image, cpus = limits.cpus, memory = %limits.memory, "Creating sandbox container");

        let mut args = vec![
            "run".to_string(),
            "-d".to_string(),
            "--network=none".to_string(),
            format!("--cpus={}", limits.cpus),
            format!("--memory={}", limits.memory),
            "-w".to_string(),
            runtime.workdir.clone(),
            image.to_string(),
        ];
        args.extend(KEEPALIVE_COMMAND.iter().map(|s| s.to_string()));

        let result = runtime.invoke(args, CaptureMode::Raw).await?;
        if result.exit_code != 0 {
            return Err(RunboxError::ContainerCreation(format!(
                "{} run exited with code {}: {}",
                runtime.binary,
                result.exit_code,
                result.stderr.trim()
            )));
        }

        let id = result.stdout.trim().to_string();
        if id.is_empty() {
            return Err(RunboxError::ContainerCreation(
                "runtime did not report a container id".to_string(),
            ));
        }

        info!(container_id = %id, "Sandbox container created");
        Ok(Self {
            id,
            runtime: runtime.clone(),
            state: ContainerState::Created,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> ContainerState {
        self.state
    }

    /// Copy a local file to `remote_path` inside the container.
    pub async fn copy_in(&mut self, local_path: &Path, remote_path: &str) -> Result<()> {
        self.ensure_live()?;
        debug!(container_id = %self.id, local = %local_path.display(), remote = %remote_path, "Copying file into container");

        let args = vec![
            "cp".to_string(),
            local_path.to_string_lossy().into_owned(),
            format!("{}:{}", self.id, remote_path),
        ];
        let result = self.runtime.invoke(args, CaptureMode::Lines).await?;

        if result.exit_code != 0 {
            return Err(RunboxError::Copy {
                path: local_path.display().to_string(),
                reason: format!("exit code {}: {}", result.exit_code, result.stderr.trim()),
            });
        }
        Ok(())
    }

    /// Run `command` in `workdir` inside the container, bounded by `timeout`.
    ///
    /// On timeout only the wait is abandoned; whatever is still running
    /// inside the container stops when the container is destroyed.
    pub async fn exec(
        &mut self,
        command: &[String],
        workdir: &str,
        timeout: Duration,
    ) -> Result<ProcessResult> {
        self.ensure_live()?;
        self.state = ContainerState::InUse;
        debug!(container_id = %self.id, command = ?command, "Executing in container");

        let mut args = vec![
            "exec".to_string(),
            "-w".to_string(),
            workdir.to_string(),
            self.id.clone(),
        ];
        args.extend(command.iter().cloned());

        match tokio::time::timeout(timeout, self.runtime.invoke(args, CaptureMode::Lines)).await {
            Ok(result) => result,
            Err(_elapsed) => {
                warn!(container_id = %self.id, timeout_secs = timeout.as_secs(), "Execution timed out");
                Err(RunboxError::ExecutionTimeout {
                    seconds: timeout.as_secs(),
                })
            }
        }
    }

    /// Kill and remove the container. Best effort and idempotent; failures
    /// are logged and never returned.
    ///
    /// The state only becomes `Destroyed` once `rm` has been attempted, so a
    /// destroy cancelled part-way still leaves removal to `Drop`.
    pub async fn destroy(&mut self) {
        if self.state == ContainerState::Destroyed {
            debug!(container_id = %self.id, "Container already destroyed");
            return;
        }
        info!(container_id = %self.id, "Destroying sandbox container");

        for action in ["kill", "rm"] {
            let mut args = vec![action.to_string()];
            if action == "rm" {
                args.push("-f".to_string());
            }
            args.push(self.id.clone());

            match self.runtime.invoke(args, CaptureMode::Lines).await {
                Ok(result) if result.exit_code != 0 => {
                    warn!(
                        container_id = %self.id,
                        action = action,
                        exit_code = result.exit_code,
                        error = %result.stderr.trim(),
                        "Container cleanup step failed"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(container_id = %self.id, action = action, error = %e, "Container cleanup step failed");
                }
            }
        }
        self.state = ContainerState::Destroyed;
    }

    fn ensure_live(&self) -> Result<()> {
        if self.state == ContainerState::Destroyed {
            return Err(RunboxError::ContainerDestroyed {
                id: self.id.clone(),
            });
        }
        Ok(())
    }
}

impl Drop for SandboxContainer {
    fn drop(&mut self) {
        if self.state == ContainerState::Destroyed {
            return;
        }
        warn!(container_id = %self.id, "Sandbox container dropped without destroy; removing in background");

        // Only reachable when the owning job future was cancelled mid-flight.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let runtime = self.runtime.clone();
            let args = vec!["rm".to_string(), "-f".to_string(), self.id.clone()];
            handle.spawn(async move {
                if let Err(e) = runtime.invoke(args, CaptureMode::Lines).await {
                    warn!(error = %e, "Background container removal failed");
                }
            });
        }
    }
}
