//! `exec`: run the external prepare command
//!
//! The command is a shell string with `${version}` substituted. It runs in
//! the working tree root with stdin closed; stdout and stderr are captured
//! and only surfaced when the command fails. A command still running at the
//! deadline is killed along with anything it spawned, and the run fails with
//! whatever output it produced so far.

use super::{PluginSpec, string_option, u64_option};
use crate::core::config::{PluginBinding, VERSION_PLACEHOLDER};
use crate::core::context::ReleaseContext;
use crate::core::error::{ConfigError, PrepareError, ReleaseError, ReleaseResult};
use crate::pipeline::plugin::{Plugin, PluginEnv};
use crate::pipeline::step::Step;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub const NAME: &str = "exec";

pub const SPEC: PluginSpec = PluginSpec {
  name: NAME,
  steps: &[Step::Prepare],
  options: &["prepare_cmd", "timeout_secs"],
};

const DEFAULT_TIMEOUT_SECS: u64 = 600;
const POLL_INTERVAL: Duration = Duration::from_millis(20);
/// How long readers get to drain after the group is killed
const KILL_GRACE: Duration = Duration::from_millis(200);

pub struct ExecPlugin {
  command: String,
  timeout: Duration,
}

/// Captured output of a finished command
#[derive(Debug)]
pub struct CommandOutput {
  pub stdout: String,
  pub stderr: String,
}

impl ExecPlugin {
  pub fn from_binding(binding: &PluginBinding) -> ReleaseResult<Self> {
    let command = string_option(binding, "prepare_cmd")?
      .filter(|c| !c.trim().is_empty())
      .ok_or_else(|| ConfigError::MissingField {
        field: format!("plugins.{}.options.prepare_cmd", NAME),
      })?;
    let timeout = Duration::from_secs(u64_option(binding, "timeout_secs", DEFAULT_TIMEOUT_SECS)?);

    Ok(Self { command, timeout })
  }
}

impl Plugin for ExecPlugin {
  fn name(&self) -> &str {
    NAME
  }

  fn steps(&self) -> &'static [Step] {
    SPEC.steps
  }

  fn prepare(&self, ctx: &mut ReleaseContext, env: &PluginEnv<'_>) -> ReleaseResult<()> {
    let version = ctx
      .next_version()
      .ok_or_else(|| ReleaseError::message("The prepare command needs the next version to be known"))?
      .to_string();
    let command = self.command.replace(VERSION_PLACEHOLDER, &version);

    tracing::info!(%command, timeout_secs = self.timeout.as_secs(), "running prepare command");
    let output = run_with_timeout(&command, env.root, self.timeout)?;
    tracing::debug!(stdout = %output.stdout.trim_end(), "prepare command finished");
    Ok(())
  }
}

fn shell(command: &str) -> Command {
  if cfg!(windows) {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", command]);
    cmd
  } else {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", command]);
    cmd
  }
}

/// Run `command` through the shell in `cwd`, killing it after `timeout`
///
/// On unix the shell leads its own process group, and the whole group is
/// killed at the deadline. Output still held open by a background job counts
/// against the same deadline.
pub fn run_with_timeout(command: &str, cwd: &Path, timeout: Duration) -> Result<CommandOutput, PrepareError> {
  let deadline = Instant::now() + timeout;
  let mut cmd = shell(command);
  cmd
    .current_dir(cwd)
    .stdin(Stdio::null())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped());
  #[cfg(unix)]
  {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
  }

  let mut child = cmd.spawn().map_err(|e| PrepareError::Spawn {
    command: command.to_string(),
    reason: e.to_string(),
  })?;

  let stdout = Capture::start(child.stdout.take());
  let stderr = Capture::start(child.stderr.take());
  let timed_out = |stdout: &Option<Capture>, stderr: &Option<Capture>| PrepareError::TimedOut {
    command: command.to_string(),
    timeout,
    stdout: Capture::text(stdout),
    stderr: Capture::text(stderr),
  };

  let status = match wait_until(&mut child, deadline) {
    Ok(Some(status)) => status,
    Ok(None) => {
      kill_group(&mut child);
      wait_for_readers(&[&stdout, &stderr], Instant::now() + KILL_GRACE);
      return Err(timed_out(&stdout, &stderr));
    }
    Err(e) => {
      kill_group(&mut child);
      return Err(PrepareError::Spawn {
        command: command.to_string(),
        reason: e.to_string(),
      });
    }
  };

  if !wait_for_readers(&[&stdout, &stderr], deadline) {
    tracing::warn!(%command, "prepare command exited but its output is still held open");
    kill_group(&mut child);
    wait_for_readers(&[&stdout, &stderr], Instant::now() + KILL_GRACE);
    return Err(timed_out(&stdout, &stderr));
  }

  let output = CommandOutput {
    stdout: Capture::text(&stdout),
    stderr: Capture::text(&stderr),
  };

  if !status.success() {
    return Err(PrepareError::Failed {
      command: command.to_string(),
      status: status.code(),
      stdout: output.stdout,
      stderr: output.stderr,
    });
  }

  Ok(output)
}

/// Poll `child` until it exits (`Some`) or the deadline passes (`None`)
fn wait_until(child: &mut Child, deadline: Instant) -> std::io::Result<Option<ExitStatus>> {
  loop {
    if let Some(status) = child.try_wait()? {
      return Ok(Some(status));
    }
    if Instant::now() >= deadline {
      return Ok(None);
    }
    thread::sleep(POLL_INTERVAL);
  }
}

/// Kill the command and everything it started, then reap it
fn kill_group(child: &mut Child) {
  #[cfg(unix)]
  {
    if let Ok(pgid) = i32::try_from(child.id()) {
      // SAFETY: killpg only sends a signal to the group our child leads
      unsafe {
        libc::killpg(pgid, libc::SIGKILL);
      }
    }
  }
  let _ = child.kill();
  let _ = child.wait();
}

/// `true` once every reader reached end of file, `false` at the deadline
fn wait_for_readers(captures: &[&Option<Capture>], deadline: Instant) -> bool {
  loop {
    if captures.iter().all(|c| c.as_ref().is_none_or(Capture::finished)) {
      return true;
    }
    if Instant::now() >= deadline {
      return false;
    }
    thread::sleep(POLL_INTERVAL);
  }
}

/// A pipe drained on its own thread into a shared buffer
///
/// The buffer can be read before the pipe closes, which is what a timeout
/// reports.
struct Capture {
  buf: Arc<Mutex<Vec<u8>>>,
  handle: JoinHandle<()>,
}

impl Capture {
  fn start<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Self> {
    pipe.map(|mut pipe| {
      let buf = Arc::new(Mutex::new(Vec::new()));
      let sink = Arc::clone(&buf);
      let handle = thread::spawn(move || {
        let mut chunk = [0u8; 8192];
        loop {
          match pipe.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => sink.lock().unwrap_or_else(|e| e.into_inner()).extend_from_slice(&chunk[..n]),
          }
        }
      });
      Self { buf, handle }
    })
  }

  fn finished(&self) -> bool {
    self.handle.is_finished()
  }

  fn text(capture: &Option<Self>) -> String {
    capture
      .as_ref()
      .map(|c| String::from_utf8_lossy(&c.buf.lock().unwrap_or_else(|e| e.into_inner())).to_string())
      .unwrap_or_default()
  }
}
