//! External helper scripts
//!
//! Document conversion, PDF field extraction and report generation are
//! delegated to Python scripts shipped with the app. Each call spawns one
//! process, buffers its output and hands it to [`protocol`] for decoding.

pub mod protocol;

use std::ffi::OsStr;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::Value;
use tempfile::NamedTempFile;

use crate::config::Settings;
use crate::error::{Result, SgsstError};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Buffered result of a finished process
#[derive(Debug)]
pub struct ScriptOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ScriptOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    fn into_exit_error(self, script: &str) -> SgsstError {
        let stderr = if self.stderr.trim().is_empty() {
            self.stdout.trim().to_string()
        } else {
            self.stderr.trim().to_string()
        };
        SgsstError::ScriptExit {
            script: script.to_string(),
            status: self.status.to_string(),
            stderr,
        }
    }
}

/// Runs scripts from one directory with one interpreter
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    interpreter: String,
    scripts_dir: PathBuf,
}

impl ScriptRunner {
    pub fn new(interpreter: impl Into<String>, scripts_dir: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            scripts_dir: scripts_dir.into(),
        }
    }

    pub fn from_settings(settings: &Settings, resource_dir: &Path) -> Self {
        Self::new(settings.python.clone(), settings.scripts_dir_or(resource_dir))
    }

    pub fn scripts_dir(&self) -> &Path {
        &self.scripts_dir
    }

    pub fn script_path(&self, script: &str) -> PathBuf {
        self.scripts_dir.join(script)
    }

    /// Run `script` with `args` and wait for it to exit
    pub fn run<S: AsRef<OsStr>>(&self, script: &str, args: &[S]) -> Result<ScriptOutput> {
        let path = self.script_path(script);
        if !path.is_file() {
            return Err(SgsstError::FileNotFound(path.to_string_lossy().to_string()));
        }

        log::info!("Running script {} ({} args)", script, args.len());
        let mut cmd = Command::new(&self.interpreter);
        cmd.arg(&path).args(args);
        run_command(cmd, script, None)
    }

    /// Run a script that prints a single JSON document on stdout
    ///
    /// A `{"success": false, "error": ...}` reply becomes [`SgsstError::Tool`]
    /// with the script's own message.
    pub fn run_json<S: AsRef<OsStr>>(&self, script: &str, args: &[S]) -> Result<Value> {
        let output = self.run(script, args)?;
        match protocol::parse_json_output(script, &output.stdout) {
            Ok(value) => protocol::check_success(value),
            Err(e) if output.success() => Err(e),
            Err(_) => Err(output.into_exit_error(script)),
        }
    }

    /// Run a script that streams `{"type": "log"|"result", ...}` lines
    ///
    /// Log lines go to the `log` facade; the `result` payload is returned.
    pub fn run_json_lines<S: AsRef<OsStr>>(&self, script: &str, args: &[S]) -> Result<Value> {
        let output = self.run(script, args)?;
        if !output.stderr.trim().is_empty() {
            log::debug!("{} stderr: {}", script, output.stderr.trim());
        }
        match protocol::parse_json_lines(script, &output.stdout) {
            Ok(payload) => protocol::check_success(payload),
            Err(e) if output.success() => Err(e),
            Err(_) => Err(output.into_exit_error(script)),
        }
    }
}

/// Spawn `cmd`, collect its output and wait for it
///
/// With a `timeout` the child is polled and killed once the deadline
/// passes. Output is drained on separate threads so a chatty child
/// cannot block on a full pipe.
pub fn run_command(mut cmd: Command, label: &str, timeout: Option<Duration>) -> Result<ScriptOutput> {
    let program = cmd.get_program().to_string_lossy().to_string();
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| SgsstError::ScriptSpawn {
            program: program.clone(),
            message: e.to_string(),
        })?;

    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let status = match timeout {
        None => child.wait()?,
        Some(limit) => {
            let started = Instant::now();
            loop {
                if let Some(status) = child.try_wait()? {
                    break status;
                }
                if started.elapsed() >= limit {
                    log::error!("{} exceeded {}s, killing process", label, limit.as_secs());
                    if let Err(e) = child.kill() {
                        log::warn!("Failed to kill {}: {}", label, e);
                    }
                    let _ = child.wait();
                    return Err(SgsstError::ScriptTimeout {
                        script: label.to_string(),
                        secs: limit.as_secs(),
                    });
                }
                thread::sleep(POLL_INTERVAL);
            }
        }
    };

    let output = ScriptOutput {
        status,
        stdout: stdout.map(join_drain).unwrap_or_default(),
        stderr: stderr.map(join_drain).unwrap_or_default(),
    };

    if output.success() {
        log::debug!("{} finished", label);
    } else {
        log::warn!("{} exited with {}", label, output.status);
    }
    Ok(output)
}

/// JSON handed to a script through a temp file, deleted on drop
#[derive(Debug)]
pub struct TempPayload {
    file: NamedTempFile,
}

impl TempPayload {
    pub fn write(prefix: &str, value: &Value) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix(&format!("{}_", prefix))
            .suffix(".json")
            .tempfile()?;
        file.write_all(&serde_json::to_vec_pretty(value)?)?;
        file.flush()?;
        log::debug!("Wrote script payload {:?}", file.path());
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn join_drain(handle: thread::JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}
