//! Free-run path: execute learner code in a child Python process.
//!
//! The child runs the host interpreter in isolated mode inside a scratch
//! directory, with stdout/stderr drained concurrently under a byte limit,
//! a wall-clock deadline that kills the child's whole process group, and
//! CPU/memory rlimits applied where the platform supports them. Nothing from the child is
//! trusted beyond its captured output and exit status.

mod limits;
mod script;

use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use serde_json::Value as JsonValue;
use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

use crate::analysis::coarse;
use crate::outcome::{ExecutionResult, RunStatus};

pub use limits::ResourceLimiter;

/// Tunables for the child process.
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    pub python_bin: String,
    /// Wall-clock deadline for the whole run.
    pub timeout: Duration,
    pub max_memory_mb: u64,
    pub max_cpu_secs: u64,
    /// Parent of the scratch working directory. Defaults to the system
    /// temp directory.
    pub scratch_base: Option<PathBuf>,
    /// Per-stream cap on captured output; bytes past it are drained and
    /// discarded.
    pub output_limit_bytes: usize,
}

impl Default for SandboxConfig {
    fn default() -> SandboxConfig {
        SandboxConfig {
            python_bin: if cfg!(windows) { "python" } else { "python3" }.to_string(),
            timeout: Duration::from_millis(2500),
            max_memory_mb: 128,
            max_cpu_secs: 2,
            scratch_base: None,
            output_limit_bytes: 50_000,
        }
    }
}

/// Run learner code in the sandbox, with `setup` bound before it.
///
/// Never returns an error: everything that can go wrong is folded into the
/// result's status and message. The duration covers the whole call, the
/// pre-spawn import scan included.
#[instrument(skip_all, fields(timeout_ms = config.timeout.as_millis() as u64))]
pub fn run(
    config: &SandboxConfig,
    code: &str,
    setup: &BTreeMap<String, JsonValue>,
) -> ExecutionResult {
    let start = Instant::now();

    if let Some(violation) = coarse::blocked_import(code) {
        debug!(rule = %violation.rule, "sandbox refused code before spawn");
        return ExecutionResult {
            status: RunStatus::Blocked,
            stdout: String::new(),
            stderr: String::new(),
            message: violation.message,
            duration: start.elapsed(),
            warnings: Vec::new(),
        };
    }

    let limiter = ResourceLimiter::probe(config.max_memory_mb, config.max_cpu_secs);
    let mut warnings = Vec::new();
    if limiter == ResourceLimiter::Unsupported {
        warnings.push("CPU/memory limits are not available on this operating system.".to_string());
    }

    let program = script::compose(setup, code);
    match spawn_and_wait(config, limiter, &program) {
        Ok(outcome) => finish(outcome, warnings, start),
        Err(err) => {
            warn!(err = %err, "sandbox run failed");
            ExecutionResult {
                status: RunStatus::Error,
                stdout: String::new(),
                stderr: String::new(),
                message: format!("Could not execute the code: {err:#}"),
                duration: start.elapsed(),
                warnings,
            }
        }
    }
}

struct ChildOutcome {
    stdout: String,
    stderr: String,
    truncated: bool,
    timed_out: bool,
    exit_ok: bool,
    signaled: bool,
}

fn spawn_and_wait(
    config: &SandboxConfig,
    limiter: ResourceLimiter,
    program: &str,
) -> Result<ChildOutcome> {
    let mut cmd = Command::new(&config.python_bin);
    cmd.args(["-I", "-c", program])
        .current_dir(scratch_dir(config))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    limiter.apply(&mut cmd);
    isolate_process_group(&mut cmd);

    debug!(python = %config.python_bin, "spawning sandbox interpreter");
    let mut child = cmd.spawn().context("spawn python")?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;
    let limit = config.output_limit_bytes;
    let stdout_handle = thread::spawn(move || read_stream_limited(stdout, limit));
    let stderr_handle = thread::spawn(move || read_stream_limited(stderr, limit));

    let mut timed_out = false;
    let status = match child.wait_timeout(config.timeout).context("wait for python")? {
        Some(status) => status,
        None => {
            warn!(timeout_ms = config.timeout.as_millis() as u64, "sandbox timed out, killing");
            timed_out = true;
            kill_tree(&mut child);
            child.wait().context("wait python after kill")?
        }
    };

    let (stdout, stdout_truncated) = join_output(stdout_handle).context("join stdout")?;
    let (stderr, stderr_truncated) = join_output(stderr_handle).context("join stderr")?;
    let truncated = stdout_truncated > 0 || stderr_truncated > 0;
    if truncated {
        warn!(stdout_truncated, stderr_truncated, "sandbox output truncated");
    }

    debug!(exit_code = ?status.code(), timed_out, "sandbox interpreter finished");
    Ok(ChildOutcome {
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        truncated,
        timed_out,
        exit_ok: status.success(),
        signaled: was_signaled(&status),
    })
}

fn finish(outcome: ChildOutcome, mut warnings: Vec<String>, start: Instant) -> ExecutionResult {
    if outcome.truncated {
        warnings.push("Output was truncated.".to_string());
    }
    let (status, message) = if outcome.timed_out {
        (RunStatus::Timeout, "Time limit exceeded.".to_string())
    } else if outcome.signaled {
        // Killed by a signal without our timeout firing: an rlimit hit.
        (
            RunStatus::Timeout,
            "Execution stopped by a resource limit.".to_string(),
        )
    } else if outcome.exit_ok {
        (RunStatus::Ok, "Execution completed.".to_string())
    } else {
        let summary = outcome
            .stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("The code exited with an error.")
            .to_string();
        (RunStatus::Error, summary)
    };
    ExecutionResult {
        status,
        stdout: outcome.stdout,
        stderr: outcome.stderr,
        message,
        duration: start.elapsed(),
        warnings,
    }
}

fn scratch_dir(config: &SandboxConfig) -> PathBuf {
    let base = config
        .scratch_base
        .clone()
        .unwrap_or_else(std::env::temp_dir);
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "anonymous".to_string());
    let dir = base.join("grader-sandbox").join(user);
    if let Err(err) = std::fs::create_dir_all(&dir) {
        warn!(err = %err, dir = %dir.display(), "could not create scratch dir, using temp dir");
        return std::env::temp_dir();
    }
    dir
}

/// Put the child at the head of a fresh process group so a timeout can
/// take out anything it spawned, not just the interpreter itself.
#[cfg(unix)]
fn isolate_process_group(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    // SAFETY: setpgid is async-signal-safe; nothing here allocates or
    // touches locks between fork and exec.
    unsafe {
        cmd.pre_exec(|| {
            libc::setpgid(0, 0);
            Ok(())
        });
    }
}

#[cfg(not(unix))]
fn isolate_process_group(_cmd: &mut Command) {}

#[cfg(unix)]
fn kill_tree(child: &mut std::process::Child) {
    // The child leads its own group, so the group signal reaches every
    // descendant. Errors are ignored; the group may already be gone.
    unsafe {
        libc::killpg(child.id() as libc::pid_t, libc::SIGKILL);
    }
    let _ = child.kill();
}

#[cfg(not(unix))]
fn kill_tree(child: &mut std::process::Child) {
    let _ = child.kill();
}

#[cfg(unix)]
fn was_signaled(status: &std::process::ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    status.signal().is_some()
}

#[cfg(not(unix))]
fn was_signaled(_status: &std::process::ExitStatus) -> bool {
    false
}

fn read_stream_limited<R: Read>(mut reader: R, limit: usize) -> Result<(Vec<u8>, usize)> {
    let mut buf = Vec::new();
    let mut truncated = 0usize;
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            break;
        }
        let remaining = limit.saturating_sub(buf.len());
        if remaining > 0 {
            let keep = n.min(remaining);
            buf.extend_from_slice(&chunk[..keep]);
            truncated += n.saturating_sub(keep);
        } else {
            truncated += n;
        }
    }

    Ok((buf, truncated))
}

fn join_output(handle: thread::JoinHandle<Result<(Vec<u8>, usize)>>) -> Result<(Vec<u8>, usize)> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_code_never_spawns() {
        let config = SandboxConfig::default();
        let result = run(&config, "import os\nos.remove('x')\n", &BTreeMap::new());
        assert_eq!(result.status, RunStatus::Blocked);
        assert_eq!(result.message, "Import blocked for safety: 'os'.");
        assert!(result.stdout.is_empty());
    }

    #[test]
    fn reader_respects_the_byte_limit() {
        let data = vec![b'a'; 20_000];
        let (kept, truncated) =
            read_stream_limited(&data[..], 8_000).expect("in-memory read cannot fail");
        assert_eq!(kept.len(), 8_000);
        assert_eq!(truncated, 12_000);
    }

    #[test]
    fn default_config_is_sane() {
        let config = SandboxConfig::default();
        assert_eq!(config.timeout, Duration::from_millis(2500));
        assert!(config.output_limit_bytes > 0);
    }
}
