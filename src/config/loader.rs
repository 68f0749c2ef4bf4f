use std::path::{Path, PathBuf};

use crate::config::types::RunboxConfig;
use crate::error::{Result, RunboxError};

/// Get the default configuration file path
pub fn get_config_path() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("com", "runbox", "runbox") {
        proj_dirs.config_dir().join("config.toml")
    } else {
        // Fallback to home directory
        dirs_fallback().join(".runbox").join("config.toml")
    }
}

fn dirs_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load configuration from file, with defaults for missing values
pub fn load_config(config_path: Option<&Path>) -> Result<RunboxConfig> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);

    if !path.exists() {
        // Return defaults if no config file exists
        return Ok(RunboxConfig::default());
    }

    let content = std::fs::read_to_string(&path)?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<RunboxConfig> {
    toml::from_str(content).map_err(|e| RunboxError::TomlParse(e.to_string()))
}

/// Get the data directory; per-caller staging directories live under it
pub fn get_data_dir() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("com", "runbox", "runbox") {
        proj_dirs.data_dir().to_path_buf()
    } else {
        dirs_fallback().join(".local").join("share").join("runbox")
    }
}

/// Resolve the staging root, falling back to `<data dir>/submitted_code`
pub fn staging_root(config: &RunboxConfig) -> PathBuf {
    config
        .staging
        .root
        .clone()
        .unwrap_or_else(|| get_data_dir().join("submitted_code"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(config.execution.timeout_seconds, 10);
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = parse_config("[execution\ncpus = ").unwrap_err();
        assert!(matches!(err, RunboxError::TomlParse(_)));
    }

    #[test]
    fn test_explicit_staging_root_wins() {
        let config = parse_config("[staging]\nroot = \"/tmp/snips\"").unwrap();
        assert_eq!(staging_root(&config), PathBuf::from("/tmp/snips"));
    }
}
