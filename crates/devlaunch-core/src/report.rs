use std::time::Duration;

use crate::launcher::DetachedProcess;
use crate::orchestrator::Stage;
use crate::project::SubProject;

/// Progress callbacks emitted while a run advances.
///
/// All methods default to no-ops so implementors pick what they show.
pub trait Reporter {
    fn stage(&mut self, _stage: Stage) {}
    fn installing(&mut self, _project: &SubProject) {}
    fn install_skipped(&mut self, _project: &SubProject) {}
    fn launching(&mut self, _project: &SubProject) {}
    fn launched(&mut self, _process: &DetachedProcess) {}
    fn waiting(&mut self, _grace: Duration) {}
}

/// Reporter that discards everything.
#[derive(Debug, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {}
