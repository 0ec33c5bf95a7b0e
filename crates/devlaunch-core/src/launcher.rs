use crate::error::{Error, Result};
use crate::platform::Platform;
use crate::project::{Role, SubProject};
use crate::runner::ProcessRunner;

/// A dev process that was started and then let go.
///
/// Only the pid is kept. Nothing waits on it, signals it, or reads its exit
/// status; it keeps running after the launcher exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetachedProcess {
    pub role: Role,
    pub pid: u32,
}

/// Start a sub-project's dev command and return as soon as it is spawned.
///
/// Readiness is not awaited.
pub fn launch(
    runner: &dyn ProcessRunner,
    platform: Platform,
    project: &SubProject,
) -> Result<DetachedProcess> {
    let spec = platform.detached(&project.launch, &project.dir);
    let pid = runner.spawn(&spec).map_err(|source| Error::Launch {
        role: project.role,
        source,
    })?;
    tracing::debug!(role = %project.role, pid, "started {}", spec);
    Ok(DetachedProcess {
        role: project.role,
        pid,
    })
}
