//! Install-marker driven dependency installation.

use crate::command::StdioMode;
use crate::error::{Error, InstallFailure, Result};
use crate::platform::Platform;
use crate::project::{Role, SubProject};
use crate::report::Reporter;
use crate::runner::{ExitOutcome, ProcessRunner};

/// Which sub-projects were installed and which were already set up.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub installed: Vec<Role>,
    pub skipped: Vec<Role>,
}

/// Make sure every sub-project has its dependencies, in the order given.
///
/// A present marker skips the sub-project outright; its contents are not
/// checked for staleness. A missing marker runs the install command in the
/// sub-project directory and blocks until it finishes. The first failure
/// aborts the remaining installs.
pub fn ensure_dependencies(
    runner: &dyn ProcessRunner,
    platform: Platform,
    projects: &[&SubProject],
    reporter: &mut dyn Reporter,
) -> Result<InstallReport> {
    let mut report = InstallReport::default();

    for project in projects {
        if project.is_installed() {
            tracing::debug!("{} exists, skipping install", project.install_marker.display());
            reporter.install_skipped(project);
            report.skipped.push(project.role);
            continue;
        }

        reporter.installing(project);
        install(runner, platform, project)?;
        report.installed.push(project.role);
    }

    Ok(report)
}

fn install(runner: &dyn ProcessRunner, platform: Platform, project: &SubProject) -> Result<()> {
    let spec = platform.blocking(&project.install, Some(&project.dir), StdioMode::Inherit);
    let outcome = runner.status(&spec).map_err(|e| Error::Install {
        role: project.role,
        reason: InstallFailure::Spawn(e),
    })?;

    match outcome {
        ExitOutcome::Success => Ok(()),
        ExitOutcome::Failure { code } => {
            tracing::warn!("{} in {} exited with {:?}", spec, project.dir.display(), code);
            Err(Error::Install {
                role: project.role,
                reason: InstallFailure::ExitStatus { code },
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandSpec;
    use crate::config::LaunchConfig;
    use crate::project::{LaunchPlan, ProjectRoot};
    use crate::report::SilentReporter;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::io;

    /// Replays queued exit outcomes for `status` calls and records every spec.
    #[derive(Default)]
    struct Replay {
        outcomes: RefCell<VecDeque<io::Result<ExitOutcome>>>,
        seen: RefCell<Vec<CommandSpec>>,
    }

    impl Replay {
        fn with(outcomes: Vec<io::Result<ExitOutcome>>) -> Self {
            Self {
                outcomes: RefCell::new(outcomes.into()),
                seen: RefCell::default(),
            }
        }
    }

    impl ProcessRunner for Replay {
        fn status(&self, spec: &CommandSpec) -> io::Result<ExitOutcome> {
            self.seen.borrow_mut().push(spec.clone());
            self.outcomes
                .borrow_mut()
                .pop_front()
                .unwrap_or(Ok(ExitOutcome::Success))
        }

        fn output(&self, _spec: &CommandSpec) -> io::Result<(ExitOutcome, String)> {
            unreachable!()
        }

        fn spawn(&self, _spec: &CommandSpec) -> io::Result<u32> {
            unreachable!()
        }
    }

    fn plan(dir: &std::path::Path) -> LaunchPlan {
        LaunchPlan::from_config(ProjectRoot::new(dir), &LaunchConfig::default()).unwrap()
    }

    fn ensure(runner: &Replay, platform: Platform, plan: &LaunchPlan) -> Result<InstallReport> {
        ensure_dependencies(runner, platform, &plan.install_order(), &mut SilentReporter)
    }

    #[test]
    fn skips_projects_with_marker() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan(dir.path());
        std::fs::create_dir_all(&plan.client.install_marker).unwrap();
        std::fs::create_dir_all(&plan.server.install_marker).unwrap();

        let runner = Replay::default();
        let report = ensure(&runner, Platform::Posix, &plan).unwrap();

        assert!(runner.seen.borrow().is_empty());
        assert_eq!(report.skipped, vec![Role::Client, Role::Server]);
        assert!(report.installed.is_empty());
    }

    #[test]
    fn installs_missing_in_project_dir() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan(dir.path());
        std::fs::create_dir_all(&plan.server.install_marker).unwrap();
        std::fs::create_dir_all(&plan.client.dir).unwrap();

        let runner = Replay::default();
        let report = ensure(&runner, Platform::Posix, &plan).unwrap();

        let seen = runner.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].to_string(), "npm install");
        assert_eq!(seen[0].cwd.as_deref(), Some(plan.client.dir.as_path()));
        assert_eq!(seen[0].stdio, StdioMode::Inherit);
        assert_eq!(report.installed, vec![Role::Client]);
        assert_eq!(report.skipped, vec![Role::Server]);
    }

    #[test]
    fn nonzero_exit_aborts_remaining() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan(dir.path());

        let runner = Replay::with(vec![Ok(ExitOutcome::Failure { code: Some(1) })]);
        let err = ensure(&runner, Platform::Posix, &plan).unwrap_err();

        assert_eq!(runner.seen.borrow().len(), 1);
        assert!(matches!(
            err,
            Error::Install {
                role: Role::Client,
                reason: InstallFailure::ExitStatus { code: Some(1) }
            }
        ));
    }

    #[test]
    fn spawn_failure_is_install_error() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan(dir.path());
        std::fs::create_dir_all(&plan.client.install_marker).unwrap();

        let runner = Replay::with(vec![Err(io::Error::from(io::ErrorKind::NotFound))]);
        let err = ensure(&runner, Platform::Posix, &plan).unwrap_err();

        assert!(matches!(
            err,
            Error::Install {
                role: Role::Server,
                reason: InstallFailure::Spawn(_)
            }
        ));
    }

    #[test]
    fn windows_install_goes_through_cmd() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan(dir.path());
        std::fs::create_dir_all(&plan.server.install_marker).unwrap();

        let runner = Replay::default();
        ensure(&runner, Platform::Windows, &plan).unwrap();
        assert_eq!(runner.seen.borrow()[0].to_string(), "cmd /C npm install");
    }
}
