//! Scripted stand-in for the docker CLI, recording every invocation.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::sandbox::runner::{CaptureMode, ProcessRunner};
use crate::sandbox::{ContainerRuntime, ProcessResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Create(Vec<String>),
    Copy { local: String, remote: String },
    Exec { container: String, command: Vec<String> },
    Kill(String),
    Remove(String),
}

#[derive(Default)]
struct Script {
    fail_create: bool,
    empty_create_output: bool,
    fail_copy: bool,
    fail_destroy: bool,
    hang_kill: bool,
    hang: HashSet<String>,
    responses: HashMap<String, ProcessResult>,
}

#[derive(Default)]
struct FakeRunner {
    script: Script,
    calls: Mutex<Vec<Invocation>>,
    /// Remote path -> file content captured at copy time
    files: Mutex<HashMap<String, String>>,
    created: AtomicUsize,
}

impl FakeRunner {
    fn record(&self, call: Invocation) {
        self.calls.lock().unwrap().push(call);
    }

    fn ok(stdout: impl Into<String>) -> ProcessResult {
        ProcessResult {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    fn failed(stderr: &str) -> ProcessResult {
        ProcessResult {
            exit_code: 1,
            stdout: String::new(),
            stderr: format!("{stderr}\n"),
        }
    }

    async fn exec(&self, workdir: &str, command: &[String]) -> ProcessResult {
        let program = command.first().cloned().unwrap_or_default();

        if self.script.hang.contains(&program) {
            tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
        }
        if let Some(response) = self.script.responses.get(&program) {
            return response.clone();
        }

        match program.as_str() {
            "echo" => Self::ok(format!("{}\n", command[1..].join(" "))),
            "cat" => {
                let files = self.files.lock().unwrap();
                let content = command
                    .get(1)
                    .and_then(|f| files.get(&format!("{}/{}", workdir.trim_end_matches('/'), f)));
                match content {
                    Some(content) => Self::ok(content.clone()),
                    None => Self::failed("cat: no such file"),
                }
            }
            _ => Self::ok(""),
        }
    }
}

#[async_trait]
impl ProcessRunner for FakeRunner {
    async fn run(
        &self,
        _program: &str,
        args: &[String],
        mode: CaptureMode,
    ) -> Result<ProcessResult> {
        let result = match args.first().map(String::as_str) {
            Some("run") => {
                self.record(Invocation::Create(args.to_vec()));
                assert_eq!(mode, CaptureMode::Raw);
                if self.script.fail_create {
                    ProcessResult {
                        exit_code: 125,
                        stdout: String::new(),
                        stderr: "Unable to find image".to_string(),
                    }
                } else if self.script.empty_create_output {
                    Self::ok("")
                } else {
                    let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
                    Self::ok(format!("fake-{n}"))
                }
            }
            Some("cp") => {
                let local = args[1].clone();
                let remote = args[2].split_once(':').map(|(_, p)| p.to_string()).unwrap_or_default();
                self.record(Invocation::Copy {
                    local: local.clone(),
                    remote: remote.clone(),
                });
                if self.script.fail_copy {
                    Self::failed("no such container path")
                } else {
                    let content = std::fs::read_to_string(&local).unwrap_or_default();
                    self.files.lock().unwrap().insert(remote, content);
                    Self::ok("")
                }
            }
            Some("exec") => {
                // exec -w <workdir> <id> <command...>
                let workdir = args[2].clone();
                let container = args[3].clone();
                let command = args[4..].to_vec();
                self.record(Invocation::Exec {
                    container,
                    command: command.clone(),
                });
                self.exec(&workdir, &command).await
            }
            Some("kill") => {
                self.record(Invocation::Kill(args[1].clone()));
                if self.script.hang_kill {
                    tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                }
                if self.script.fail_destroy {
                    Self::failed("is not running")
                } else {
                    Self::ok("")
                }
            }
            Some("rm") => {
                self.record(Invocation::Remove(args.last().cloned().unwrap_or_default()));
                if self.script.fail_destroy {
                    Self::failed("no such container")
                } else {
                    Self::ok("")
                }
            }
            other => panic!("unexpected runtime invocation: {other:?}"),
        };
        Ok(result)
    }
}

/// Builder and inspector for a [`FakeRunner`]-backed [`ContainerRuntime`].
#[derive(Default)]
pub struct FakeRuntime {
    script: Script,
    runner: Option<Arc<FakeRunner>>,
}

impl FakeRuntime {
    pub const WORKDIR: &'static str = "/home/submitted_code";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_create(mut self) -> Self {
        self.script.fail_create = true;
        self
    }

    pub fn empty_create_output(mut self) -> Self {
        self.script.empty_create_output = true;
        self
    }

    pub fn fail_copy(mut self) -> Self {
        self.script.fail_copy = true;
        self
    }

    pub fn fail_destroy(mut self) -> Self {
        self.script.fail_destroy = true;
        self
    }

    pub fn hang_on_kill(mut self) -> Self {
        self.script.hang_kill = true;
        self
    }

    pub fn hang_on(mut self, programs: &[&str]) -> Self {
        self.script.hang.extend(programs.iter().map(|p| p.to_string()));
        self
    }

    pub fn respond(mut self, program: &str, exit_code: i32, stdout: &str, stderr: &str) -> Self {
        self.script.responses.insert(
            program.to_string(),
            ProcessResult {
                exit_code,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            },
        );
        self
    }

    /// The runtime handle; the script is frozen on first call.
    pub fn runtime(&mut self) -> ContainerRuntime {
        let runner = self.runner.get_or_insert_with(|| {
            Arc::new(FakeRunner {
                script: std::mem::take(&mut self.script),
                ..FakeRunner::default()
            })
        });
        ContainerRuntime::new(runner.clone(), "docker", Self::WORKDIR)
    }

    fn inner(&self) -> &FakeRunner {
        self.runner.as_deref().expect("runtime() not called yet")
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.inner().calls.lock().unwrap().clone()
    }

    /// Id of the most recently created container.
    pub fn container_id(&self) -> String {
        format!("fake-{}", self.inner().created.load(Ordering::SeqCst))
    }

    pub fn create_count(&self) -> usize {
        self.count(|c| matches!(c, Invocation::Create(_)))
    }

    pub fn destroy_count(&self) -> usize {
        self.count(|c| matches!(c, Invocation::Remove(_)))
    }

    pub fn exec_commands(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Invocation::Exec { command, .. } => Some(command),
                _ => None,
            })
            .collect()
    }

    pub fn copies(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Invocation::Copy { local, remote } => Some((local, remote)),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&Invocation) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }
}
