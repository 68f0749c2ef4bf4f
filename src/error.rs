use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunboxError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    // Job errors
    #[error("Unsupported language '{language}'")]
    UnsupportedLanguage {
        language: String,
        supported: Vec<String>,
    },

    #[error("Staged source already exists: {path}")]
    JobIdCollision { path: String },

    // Runtime errors
    #[error("Container runtime '{binary}' not found in PATH")]
    RuntimeNotFound { binary: String },

    #[error("Failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Container creation failed: {0}")]
    ContainerCreation(String),

    #[error("Failed to copy {path} into container: {reason}")]
    Copy { path: String, reason: String },

    #[error("Execution timed out after {seconds} seconds")]
    ExecutionTimeout { seconds: u64 },

    #[error("Container {id} has already been destroyed")]
    ContainerDestroyed { id: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RunboxError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ExecutionTimeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, RunboxError>;
