use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, RunboxError};
use crate::sandbox::ProcessResult;

/// How captured lines are accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Every line keeps a trailing newline
    Lines,
    /// Lines are concatenated without terminators (bare identifiers)
    Raw,
}

/// Runs an external executable to completion and captures its output.
///
/// A program that starts but fails reports through its exit code; only a
/// program that cannot be started at all is an `Err`.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String], mode: CaptureMode)
        -> Result<ProcessResult>;
}

/// Runner backed by real child processes.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        mode: CaptureMode,
    ) -> Result<ProcessResult> {
        debug!(program = %program, args = ?args, "Spawning process");

        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        // Dropping the future (e.g. on timeout) reaps the local client process.
        cmd.kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| RunboxError::Launch {
            program: program.to_string(),
            source,
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (stdout, stderr, status) = tokio::join!(
            read_lines(stdout, mode),
            read_lines(stderr, mode),
            child.wait()
        );
        let status = status?;
        let exit_code = status.code().unwrap_or(-1);

        debug!(
            program = %program,
            exit_code = exit_code,
            stdout_len = stdout.len(),
            stderr_len = stderr.len(),
            "Process exited"
        );

        Ok(ProcessResult {
            exit_code,
            stdout,
            stderr,
        })
    }
}

/// Accumulate a stream line by line in arrival order.
///
/// Lines are decoded lossily so a stray non UTF-8 byte never cuts the
/// stream short; the pipe is always drained to EOF.
async fn read_lines<R: AsyncRead + Unpin>(stream: Option<R>, mode: CaptureMode) -> String {
    let mut out = String::new();
    let Some(stream) = stream else {
        return out;
    };

    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = strip_terminator(&buf);
                out.push_str(&String::from_utf8_lossy(line));
                if mode == CaptureMode::Lines {
                    out.push('\n');
                }
            }
            Err(e) => {
                debug!(error = %e, "Stopped reading process output");
                break;
            }
        }
    }
    out
}

fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_captures_both_streams_and_exit_code() {
        let result = SystemRunner
            .run(
                "sh",
                &args(&["-c", "echo one; echo two; echo oops >&2; exit 3"]),
                CaptureMode::Lines,
            )
            .await
            .unwrap();

        assert_eq!(result.exit_code, 3);
        assert_eq!(result.stdout, "one\ntwo\n");
        assert_eq!(result.stderr, "oops\n");
    }

    #[tokio::test]
    async fn test_raw_mode_drops_terminators() {
        let result = SystemRunner
            .run("sh", &args(&["-c", "echo abc123"]), CaptureMode::Raw)
            .await
            .unwrap();

        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout, "abc123");
    }

    #[tokio::test]
    async fn test_missing_executable_is_launch_failure() {
        let err = SystemRunner
            .run("runbox-definitely-not-a-binary", &[], CaptureMode::Lines)
            .await
            .unwrap_err();

        assert!(matches!(err, RunboxError::Launch { .. }));
    }

    #[tokio::test]
    async fn test_invalid_utf8_does_not_truncate_output() {
        let result = SystemRunner
            .run(
                "sh",
                &args(&["-c", "printf 'before\\n\\377\\nafter\\r\\n'; echo err-tail >&2"]),
                CaptureMode::Lines,
            )
            .await
            .unwrap();

        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout, "before\n\u{FFFD}\nafter\n");
        assert_eq!(result.stderr, "err-tail\n");
    }

    #[tokio::test]
    async fn test_large_output_after_bad_byte_is_drained() {
        let result = SystemRunner
            .run(
                "sh",
                &args(&["-c", "printf '\\377\\n'; i=0; while [ $i -lt 20000 ]; do echo line; i=$((i+1)); done"]),
                CaptureMode::Lines,
            )
            .await
            .unwrap();

        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout.matches("line\n").count(), 20000);
    }
}
