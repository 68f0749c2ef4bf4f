//! Presentation of job outcomes. Rendering is pure; the caller prints and exits.

use serde_json::json;

use crate::cli::args::OutputFormat;
use crate::error::{Result, RunboxError};
use crate::languages::LanguageRegistry;
use crate::sandbox::ProcessResult;

pub const EXIT_UNSUPPORTED: i32 = 2;
pub const EXIT_TIMEOUT: i32 = 124;
pub const EXIT_FAILURE: i32 = 1;

/// Text destined for the terminal plus the process exit code.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Rendered {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Canonical id for `requested` when it names a known language, else the input as given.
pub fn resolved_language<'a>(registry: &'a LanguageRegistry, requested: &'a str) -> &'a str {
    registry
        .resolve(requested)
        .map(|l| l.id.as_str())
        .unwrap_or(requested)
}

pub fn render_outcome(
    language: &str,
    outcome: &Result<ProcessResult>,
    format: OutputFormat,
) -> Rendered {
    match format {
        OutputFormat::Text => render_text(outcome),
        OutputFormat::Json => render_json(language, outcome),
    }
}

fn render_text(outcome: &Result<ProcessResult>) -> Rendered {
    match outcome {
        // Empty streams simply print nothing.
        Ok(result) => Rendered {
            stdout: result.stdout.clone(),
            stderr: result.stderr.clone(),
            exit_code: result.exit_code,
        },
        Err(RunboxError::UnsupportedLanguage {
            language,
            supported,
        }) => {
            let mut stderr = format!("Unsupported language '{}'\nSupported languages:\n", language);
            for line in supported {
                stderr.push_str(&format!("- {}\n", line));
            }
            Rendered {
                stdout: String::new(),
                stderr,
                exit_code: EXIT_UNSUPPORTED,
            }
        }
        Err(e) if e.is_timeout() => Rendered {
            stdout: String::new(),
            stderr: format!("{}\n", e),
            exit_code: EXIT_TIMEOUT,
        },
        Err(e) => Rendered {
            stdout: String::new(),
            stderr: format!("Execution failed: {}\n", e),
            exit_code: EXIT_FAILURE,
        },
    }
}

fn render_json(language: &str, outcome: &Result<ProcessResult>) -> Rendered {
    let (value, exit_code) = match outcome {
        Ok(result) => (
            json!({
                "language": language,
                "exit_code": result.exit_code,
                "stdout": result.stdout,
                "stderr": result.stderr,
            }),
            result.exit_code,
        ),
        Err(RunboxError::UnsupportedLanguage {
            language,
            supported,
        }) => (
            json!({
                "error": "unsupported_language",
                "message": format!("Unsupported language '{}'", language),
                "supported": supported,
            }),
            EXIT_UNSUPPORTED,
        ),
        Err(e) if e.is_timeout() => (
            json!({ "error": "timeout", "message": e.to_string() }),
            EXIT_TIMEOUT,
        ),
        Err(e) => (
            json!({ "error": "failure", "message": e.to_string() }),
            EXIT_FAILURE,
        ),
    };

    Rendered {
        stdout: format!("{}\n", value),
        stderr: String::new(),
        exit_code,
    }
}

pub fn render_languages(registry: &LanguageRegistry, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut out = String::from("Supported languages:\n");
            for line in registry.summaries() {
                out.push_str(&format!("- {}\n", line));
            }
            out
        }
        OutputFormat::Json => {
            let languages: Vec<_> = registry
                .list()
                .iter()
                .map(|l| {
                    json!({
                        "id": l.id,
                        "aliases": l.aliases,
                        "extension": l.extension,
                        "image": l.image,
                        "compiled": l.is_compiled(),
                        "run": l.run.parts(),
                    })
                })
                .collect();
            format!("{}\n", serde_json::Value::Array(languages))
        }
    }
}
