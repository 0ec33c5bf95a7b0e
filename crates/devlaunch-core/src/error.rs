use std::io;

use thiserror::Error;

use crate::project::Role;

/// Fatal conditions that stop a launch run.
///
/// None of these are retried. The orchestrator converts each into a
/// `Failed` outcome and the CLI maps that to exit code 1.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{runtime} was not found (is it installed and on PATH?)")]
    RuntimeMissing { runtime: String },

    #[error("installing {role} dependencies failed: {reason}")]
    Install { role: Role, reason: InstallFailure },

    #[error("starting the {role} failed: {source}")]
    Launch {
        role: Role,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

#[derive(Debug, Error)]
pub enum InstallFailure {
    #[error("could not run install command: {0}")]
    Spawn(#[source] io::Error),

    #[error("install command exited with {}", describe_code(.code))]
    ExitStatus { code: Option<i32> },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
