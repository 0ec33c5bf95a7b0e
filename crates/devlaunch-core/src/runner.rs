use std::io;
use std::process::{Command, ExitStatus, Stdio};

use crate::command::{CommandSpec, StdioMode};

/// How a blocking command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    Failure { code: Option<i32> },
}

impl ExitOutcome {
    pub fn success(self) -> bool {
        matches!(self, ExitOutcome::Success)
    }
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        if status.success() {
            ExitOutcome::Success
        } else {
            ExitOutcome::Failure {
                code: status.code(),
            }
        }
    }
}

/// Executes [`CommandSpec`]s against the OS.
///
/// Everything the launcher does to the outside world goes through this trait,
/// so tests can substitute a recorder.
pub trait ProcessRunner {
    /// Run to completion and report how it exited.
    fn status(&self, spec: &CommandSpec) -> io::Result<ExitOutcome>;

    /// Run to completion and capture stdout.
    fn output(&self, spec: &CommandSpec) -> io::Result<(ExitOutcome, String)>;

    /// Start without waiting. Returns the child's pid.
    fn spawn(&self, spec: &CommandSpec) -> io::Result<u32>;
}

/// [`ProcessRunner`] backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(spec: &CommandSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }
        match spec.stdio {
            StdioMode::Inherit => {}
            StdioMode::Quiet => {
                cmd.stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null());
            }
            StdioMode::Background => {
                cmd.stdin(Stdio::null());
            }
        }
        apply_detach_flags(&mut cmd, spec);
        cmd
    }
}

#[cfg(unix)]
fn apply_detach_flags(cmd: &mut Command, spec: &CommandSpec) {
    use std::os::unix::process::CommandExt;
    if spec.own_process_group {
        cmd.process_group(0);
    }
}

#[cfg(not(unix))]
fn apply_detach_flags(_cmd: &mut Command, _spec: &CommandSpec) {}

impl ProcessRunner for SystemRunner {
    fn status(&self, spec: &CommandSpec) -> io::Result<ExitOutcome> {
        tracing::debug!("exec: {}", spec);
        let status = Self::command(spec).status()?;
        Ok(status.into())
    }

    fn output(&self, spec: &CommandSpec) -> io::Result<(ExitOutcome, String)> {
        tracing::debug!("exec (capture): {}", spec);
        let output = Self::command(spec)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()?;
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((output.status.into(), stdout))
    }

    fn spawn(&self, spec: &CommandSpec) -> io::Result<u32> {
        tracing::debug!("spawn: {}", spec);
        // Dropping the Child neither waits on nor kills the process.
        let child = Self::command(spec).spawn()?;
        Ok(child.id())
    }
}
