use std::fmt;
use std::path::Path;

use crate::command::{CommandLine, CommandSpec, StdioMode};

/// How commands are wrapped for the host OS.
///
/// Resolved once per run with [`Platform::current`] and passed to every call
/// that builds a command, so both launches always use the same strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Dev servers get their own console window that stays open after exit.
    Windows,
    /// Dev servers run as background children sharing this terminal's output.
    Posix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }

    /// Wrap a command that runs to completion (runtime probe, install).
    ///
    /// On Windows this goes through `cmd /C` so `.cmd` shims like `npm.cmd`
    /// resolve the same way they do in a shell.
    pub fn blocking(self, cmd: &CommandLine, dir: Option<&Path>, stdio: StdioMode) -> CommandSpec {
        let spec = match self {
            Platform::Windows => CommandSpec::new("cmd", shell_args("/C", cmd)),
            Platform::Posix => CommandSpec::new(cmd.program(), cmd.args().to_vec()),
        };
        let spec = spec.stdio(stdio);
        match dir {
            Some(dir) => spec.in_dir(dir),
            None => spec,
        }
    }

    /// Wrap a long-running command that is started and left alone.
    pub fn detached(self, cmd: &CommandLine, dir: &Path) -> CommandSpec {
        match self {
            Platform::Windows => {
                // `start` gives the window its own console handles, and /K keeps
                // it open so errors stay readable. The empty string is the title.
                let mut args = ["/C", "start", "", "cmd"].map(String::from).to_vec();
                args.extend(shell_args("/K", cmd));
                CommandSpec::new("cmd", args).in_dir(dir)
            }
            Platform::Posix => {
                let mut spec = CommandSpec::new(cmd.program(), cmd.args().to_vec())
                    .in_dir(dir)
                    .stdio(StdioMode::Background);
                spec.own_process_group = true;
                spec
            }
        }
    }

    /// How the operator stops the dev servers afterwards.
    pub fn stop_hint(self) -> &'static str {
        match self {
            Platform::Windows => "To stop the servers, close their console windows",
            Platform::Posix => {
                "To stop the servers, end the processes listed above (e.g. `kill <pid>`)"
            }
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Windows => f.write_str("windows"),
            Platform::Posix => f.write_str("posix"),
        }
    }
}

fn shell_args(switch: &str, cmd: &CommandLine) -> Vec<String> {
    let mut args = Vec::with_capacity(cmd.args().len() + 2);
    args.push(switch.to_string());
    args.push(cmd.program().to_string());
    args.extend(cmd.args().iter().cloned());
    args
}
