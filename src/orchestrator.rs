//! Drives one job from `(language, code)` to a [`ProcessResult`].
//!
//! Per job: resolve the language, stage the rendered source, create a
//! container, copy the source in, compile if needed, run, destroy. Once a
//! container exists it is destroyed on every path, including timeouts, since
//! destruction is what stops anything still running inside it.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::loader::staging_root;
use crate::config::types::RunboxConfig;
use crate::error::{Result, RunboxError};
use crate::job::JobId;
use crate::languages::{LanguageDescriptor, LanguageRegistry};
use crate::sandbox::{ContainerRuntime, ExecutionLimits, ProcessResult, SandboxContainer};
use crate::staging::{StagedSource, StagingArea};

/// Fresh identifiers drawn before giving up on a crowded staging directory.
const MAX_STAGING_ATTEMPTS: usize = 4;

pub struct Orchestrator {
    registry: Arc<LanguageRegistry>,
    runtime: ContainerRuntime,
    limits: ExecutionLimits,
    staging: StagingArea,
    retain_sources: bool,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<LanguageRegistry>,
        runtime: ContainerRuntime,
        limits: ExecutionLimits,
        staging: StagingArea,
    ) -> Self {
        Self {
            registry,
            runtime,
            limits,
            staging,
            retain_sources: false,
        }
    }

    /// Keep staged sources on disk after each job.
    pub fn retain_sources(mut self, retain: bool) -> Self {
        self.retain_sources = retain;
        self
    }

    /// Wire everything from configuration against the real container CLI.
    pub fn from_config(config: &RunboxConfig) -> Result<Self> {
        let registry = LanguageRegistry::with_overrides(config.languages.clone())?;
        let runtime = ContainerRuntime::from_config(&config.runtime)?;
        let limits = ExecutionLimits::from_config(&config.execution)?;
        let staging = StagingArea::new(staging_root(config));

        Ok(Self::new(Arc::new(registry), runtime, limits, staging)
            .retain_sources(config.staging.retain))
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    /// Compile (when the language requires it) and run `code` for `caller`.
    ///
    /// A failed compile is returned as the job's result, not as an error; the
    /// run step is skipped.
    pub async fn execute(&self, caller: &str, language: &str, code: &str) -> Result<ProcessResult> {
        let lang = self
            .registry
            .resolve(language)
            .ok_or_else(|| RunboxError::UnsupportedLanguage {
                language: language.to_string(),
                supported: self.registry.summaries(),
            })?;

        let (job_id, staged) = self.stage(caller, lang, code).await?;
        info!(job_id = %job_id, language = %lang.id, caller = %caller, "Starting job");

        let outcome = self.run_staged(lang, &job_id, &staged).await;

        if !self.retain_sources {
            self.staging.remove(&staged).await;
        }

        match &outcome {
            Ok(result) => info!(job_id = %job_id, exit_code = result.exit_code, "Job finished"),
            Err(e) => warn!(job_id = %job_id, error = %e, "Job failed"),
        }
        outcome
    }

    async fn stage(
        &self,
        caller: &str,
        lang: &LanguageDescriptor,
        code: &str,
    ) -> Result<(JobId, StagedSource)> {
        let mut attempt = 1;
        loop {
            let job_id = JobId::generate();
            match self.staging.write(caller, &job_id, lang, code).await {
                Ok(staged) => return Ok((job_id, staged)),
                Err(RunboxError::JobIdCollision { path }) if attempt < MAX_STAGING_ATTEMPTS => {
                    warn!(path = %path, attempt = attempt, "Job id collided with a staged file, regenerating");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn run_staged(
        &self,
        lang: &LanguageDescriptor,
        job_id: &JobId,
        staged: &StagedSource,
    ) -> Result<ProcessResult> {
        let mut container = SandboxContainer::create(&self.runtime, &lang.image, &self.limits).await?;

        let outcome = self.drive(&mut container, lang, job_id, staged).await;
        container.destroy().await;
        outcome
    }

    async fn drive(
        &self,
        container: &mut SandboxContainer,
        lang: &LanguageDescriptor,
        job_id: &JobId,
        staged: &StagedSource,
    ) -> Result<ProcessResult> {
        let workdir = self.runtime.workdir();
        let remote_path = format!("{}/{}", workdir.trim_end_matches('/'), staged.file_name);
        container.copy_in(&staged.path, &remote_path).await?;

        if let Some(compile) = lang.compile_command(&staged.file_name, job_id.as_str()) {
            let compiled = container.exec(&compile, workdir, self.limits.timeout).await?;
            if compiled.exit_code != 0 {
                info!(job_id = %job_id, exit_code = compiled.exit_code, "Compilation failed");
                return Ok(compiled);
            }
        }

        let run = lang.run_command(&staged.file_name, job_id.as_str());
        container.exec(&run, workdir, self.limits.timeout).await
    }
}
