use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunboxConfig {
    pub execution: ExecutionConfig,
    pub staging: StagingConfig,
    pub runtime: RuntimeConfig,
    /// Extra languages appended to (or replacing) the built-in table
    pub languages: Vec<LanguageConfig>,
}

/// Resource limits applied to every sandbox container.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// CPU share as a fraction of one core (docker `--cpus`)
    pub cpus: f64,
    /// Memory ceiling as a size string, e.g. "250m" (docker `--memory`)
    pub memory: String,
    /// Wall-clock limit for each compile or run step, in seconds
    pub timeout_seconds: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            cpus: 0.8,
            memory: "250m".to_string(),
            timeout_seconds: 10,
        }
    }
}

/// Where rendered sources are written before being copied into a container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StagingConfig {
    /// Root of the per-caller staging directories (default: data dir)
    pub root: Option<PathBuf>,
    /// Keep staged files after the job completes
    pub retain: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Docker-compatible CLI used to manage containers
    pub binary: String,
    /// Directory inside the container where sources are placed and run
    pub workdir: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            binary: "docker".to_string(),
            workdir: "/home/submitted_code".to_string(),
        }
    }
}

/// A language descriptor as written in the configuration file.
///
/// Templates use `{code}` and `{job_id}` (source) or `{file}` and `{job_id}`
/// (commands) placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageConfig {
    pub id: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub extension: String,
    pub image: String,
    #[serde(default = "default_source_template")]
    pub source_template: String,
    pub run: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile: Option<Vec<String>>,
}

fn default_source_template() -> String {
    "{code}".to_string()
}
