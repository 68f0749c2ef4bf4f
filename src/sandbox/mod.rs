mod container;
mod runner;

#[cfg(test)]
pub(crate) mod fake;

pub use container::{ContainerRuntime, ContainerState, SandboxContainer};
pub use runner::{CaptureMode, ProcessRunner, SystemRunner};

use std::time::Duration;

use serde::Serialize;

use crate::config::types::ExecutionConfig;
use crate::error::{Result, RunboxError};

/// Result of running a single command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Resource limits for one sandbox container; cheap to clone and share.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionLimits {
    pub cpus: f64,
    pub memory: String,
    pub timeout: Duration,
}

impl ExecutionLimits {
    pub fn from_config(config: &ExecutionConfig) -> Result<Self> {
        if !config.cpus.is_finite() || config.cpus <= 0.0 {
            return Err(RunboxError::Config(format!(
                "execution.cpus must be a positive number, got {}",
                config.cpus
            )));
        }
        if !is_size_string(&config.memory) {
            return Err(RunboxError::Config(format!(
                "execution.memory must look like \"250m\", got {:?}",
                config.memory
            )));
        }
        if config.timeout_seconds == 0 {
            return Err(RunboxError::Config(
                "execution.timeout_seconds must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            cpus: config.cpus,
            memory: config.memory.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        })
    }
}

/// `<digits>[b|k|m|g]`, case-insensitive unit
fn is_size_string(s: &str) -> bool {
    let digits = s.trim_end_matches(|c: char| matches!(c.to_ascii_lowercase(), 'b' | 'k' | 'm' | 'g'));
    let unit_len = s.len() - digits.len();
    !digits.is_empty() && unit_len <= 1 && digits.bytes().all(|b| b.is_ascii_digit())
}
