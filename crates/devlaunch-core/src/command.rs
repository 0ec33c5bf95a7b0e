use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A program and its arguments, before any platform wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Build from a config array such as `["npm", "run", "dev"]`.
    /// `what` names the setting in the error for an empty array.
    pub fn from_parts(parts: &[String], what: &str) -> Result<Self> {
        match parts.split_first() {
            Some((program, args)) if !program.trim().is_empty() => Ok(Self {
                program: program.clone(),
                args: args.to_vec(),
            }),
            _ => Err(Error::Config(format!("{} must name a program", what))),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// How the child's standard streams are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioMode {
    /// Share the launcher's terminal.
    Inherit,
    /// Discard all output.
    Quiet,
    /// stdin detached, stdout/stderr shared. Used for background children.
    Background,
}

/// A fully wrapped invocation, ready for a [`crate::runner::ProcessRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub stdio: StdioMode,
    /// Start in a separate process group (Posix only).
    pub own_process_group: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            cwd: None,
            stdio: StdioMode::Inherit,
            own_process_group: false,
        }
    }

    pub fn in_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    pub fn stdio(mut self, stdio: StdioMode) -> Self {
        self.stdio = stdio;
        self
    }
}

/// Command line as it would be typed, for logs.
impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() {
                f.write_str(" \"\"")?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_parts_splits_program_and_args() {
        let parts = vec!["npm".to_string(), "run".to_string(), "dev".to_string()];
        let cmd = CommandLine::from_parts(&parts, "launch.command").unwrap();
        assert_eq!(cmd.program(), "npm");
        assert_eq!(cmd.args(), ["run", "dev"]);
        assert_eq!(cmd.to_string(), "npm run dev");
    }

    #[test]
    fn from_parts_rejects_empty() {
        let err = CommandLine::from_parts(&[], "dependencies.install").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration: dependencies.install must name a program"
        );
    }

    #[test]
    fn from_parts_rejects_blank_program() {
        let parts = vec!["  ".to_string(), "install".to_string()];
        assert!(CommandLine::from_parts(&parts, "dependencies.install").is_err());
    }

    #[test]
    fn spec_display_joins_args() {
        let spec = CommandSpec::new("cmd", vec!["/C".into(), "npm".into(), "install".into()]);
        assert_eq!(spec.to_string(), "cmd /C npm install");
        assert_eq!(spec.stdio, StdioMode::Inherit);
        assert!(spec.cwd.is_none());
    }

    #[test]
    fn spec_display_quotes_empty_args() {
        let spec = CommandSpec::new("cmd", vec!["/C".into(), "start".into(), String::new()]);
        assert_eq!(spec.to_string(), r#"cmd /C start """#);
    }
}
