//! Runtime availability probe.

use crate::command::{CommandLine, StdioMode};
use crate::platform::Platform;
use crate::runner::ProcessRunner;

/// Run the runtime's version query with output suppressed.
///
/// True only when it exits successfully. A missing binary, a non-zero exit
/// and any other launch error all read as "not available".
pub fn check_runtime_available(
    runner: &dyn ProcessRunner,
    platform: Platform,
    probe: &CommandLine,
) -> bool {
    let spec = platform.blocking(probe, None, StdioMode::Quiet);
    match runner.status(&spec) {
        Ok(outcome) => {
            if !outcome.success() {
                tracing::debug!("{} exited with {:?}", spec, outcome);
            }
            outcome.success()
        }
        Err(e) => {
            tracing::debug!("{} could not start: {}", spec, e);
            false
        }
    }
}

/// First line of the version query's stdout, if it ran successfully.
pub fn runtime_version(
    runner: &dyn ProcessRunner,
    platform: Platform,
    probe: &CommandLine,
) -> Option<String> {
    let spec = platform.blocking(probe, None, StdioMode::Inherit);
    match runner.output(&spec) {
        Ok((outcome, stdout)) if outcome.success() => stdout.lines().next().map(str::to_string),
        _ => None,
    }
}
