//! External tool invocation
//!
//! Every subprocess the harness spawns (program generator, compiler, size
//! tool) goes through this wrapper so callers see one structured result
//! instead of scattering `Command` plumbing across the pipeline. A hung
//! external tool must not stall the run, so invocations carry an optional
//! wall-clock budget enforced by polling the child.

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;

/// Errors raised while launching or reaping an external tool
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("failed to launch {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to collect output from {tool}: {source}")]
    Collect {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

/// Captured result of one external tool invocation
#[derive(Debug)]
pub struct ToolOutput {
    /// Exit code; `None` when the child was killed by a signal or timeout
    pub status: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// The invocation exceeded its time budget and was killed
    pub timed_out: bool,
}

impl ToolOutput {
    /// True when the tool ran to completion with exit code 0
    pub fn success(&self) -> bool {
        !self.timed_out && self.status == Some(0)
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Poll interval while waiting on a child with a deadline
const WAIT_POLL: Duration = Duration::from_millis(25);

/// Run `command` to completion, capturing stdout and stderr.
///
/// With `timeout = Some(t)` the child is killed once `t` elapses and the
/// output is marked `timed_out`; `None` waits indefinitely. Pipes are
/// drained on dedicated threads so a chatty child never blocks on a full
/// pipe buffer while the parent waits.
pub fn run_tool(
    command: &mut Command,
    timeout: Option<Duration>,
) -> Result<ToolOutput, ExecError> {
    let tool = command.get_program().to_string_lossy().into_owned();

    command.stdout(Stdio::piped()).stderr(Stdio::piped());
    let mut child = command.spawn().map_err(|source| ExecError::Spawn {
        tool: tool.clone(),
        source,
    })?;

    let stdout_reader = child.stdout.take().map(drain_pipe);
    let stderr_reader = child.stderr.take().map(drain_pipe);

    let deadline = timeout.map(|t| Instant::now() + t);
    let (status, timed_out) = wait_with_deadline(&mut child, deadline, &tool)?;

    let stdout = stdout_reader
        .and_then(|h| h.join().ok())
        .unwrap_or_default();
    let stderr = stderr_reader
        .and_then(|h| h.join().ok())
        .unwrap_or_default();

    Ok(ToolOutput {
        status,
        stdout,
        stderr,
        timed_out,
    })
}

// Output stays raw bytes: generator stdout is written verbatim into the
// workspace, so no lossy text conversion here.
fn drain_pipe<P: Read + Send + 'static>(mut pipe: P) -> std::thread::JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn wait_with_deadline(
    child: &mut Child,
    deadline: Option<Instant>,
    tool: &str,
) -> Result<(Option<i32>, bool), ExecError> {
    loop {
        let status = child.try_wait().map_err(|source| ExecError::Collect {
            tool: tool.to_string(),
            source,
        })?;
        match status {
            Some(status) => return Ok((status.code(), false)),
            None => {
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    // The child may exit between try_wait and kill; both
                    // results are fine, the trial is discarded either way.
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok((None, true));
                }
                std::thread::sleep(WAIT_POLL);
            }
        }
    }
}
