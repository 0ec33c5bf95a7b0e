//! Startup sequencing: runtime check, installs, server, grace delay, client.
//!
//! The run is strictly sequential and stops at the first failure. Nothing is
//! retried and nothing is rolled back: if the client fails to start, the
//! server that was already launched keeps running.

use std::fmt;

use crate::error::Error;
use crate::installer::{self, InstallReport};
use crate::interrupt::Interrupt;
use crate::launcher::{self, DetachedProcess};
use crate::platform::Platform;
use crate::preflight;
use crate::project::LaunchPlan;
use crate::report::Reporter;
use crate::runner::ProcessRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    RuntimeChecked,
    DepsInstalled,
    ServerLaunched,
    ClientLaunched,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::RuntimeChecked => "runtime checked",
            Stage::DepsInstalled => "dependencies installed",
            Stage::ServerLaunched => "server launched",
            Stage::ClientLaunched => "client launched",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// What a successful run started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSummary {
    pub platform: Platform,
    pub installs: InstallReport,
    pub server: DetachedProcess,
    pub client: DetachedProcess,
}

/// Terminal state of a run. `stage` is the last stage reached.
#[derive(Debug)]
pub enum Outcome {
    Done(LaunchSummary),
    Failed { stage: Stage, error: Error },
    Interrupted { stage: Stage },
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Done(_) | Outcome::Interrupted { .. } => 0,
            Outcome::Failed { .. } => 1,
        }
    }
}

enum Halt {
    Failed(Error),
    Interrupted,
}

impl From<Error> for Halt {
    fn from(error: Error) -> Self {
        Halt::Failed(error)
    }
}

pub struct Orchestrator<'a> {
    runner: &'a dyn ProcessRunner,
    platform: Platform,
    plan: &'a LaunchPlan,
    interrupt: Interrupt,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        runner: &'a dyn ProcessRunner,
        platform: Platform,
        plan: &'a LaunchPlan,
        interrupt: Interrupt,
    ) -> Self {
        Self {
            runner,
            platform,
            plan,
            interrupt,
        }
    }

    pub fn run(&self, reporter: &mut dyn Reporter) -> Outcome {
        let mut stage = Stage::Init;
        match self.advance(&mut stage, reporter) {
            Ok(summary) => Outcome::Done(summary),
            Err(Halt::Interrupted) => Outcome::Interrupted { stage },
            // An interrupt also reaches foreground children, so a step failing
            // right after one is the interrupt's doing.
            Err(Halt::Failed(_)) if self.interrupt.is_triggered() => Outcome::Interrupted { stage },
            Err(Halt::Failed(error)) => {
                tracing::debug!(%stage, "run failed: {}", error);
                Outcome::Failed { stage, error }
            }
        }
    }

    fn checkpoint(&self) -> Result<(), Halt> {
        if self.interrupt.is_triggered() {
            Err(Halt::Interrupted)
        } else {
            Ok(())
        }
    }

    fn enter(&self, stage: &mut Stage, next: Stage, reporter: &mut dyn Reporter) {
        tracing::debug!("{} -> {}", stage, next);
        *stage = next;
        reporter.stage(next);
    }

    fn advance(
        &self,
        stage: &mut Stage,
        reporter: &mut dyn Reporter,
    ) -> Result<LaunchSummary, Halt> {
        let plan = self.plan;

        self.checkpoint()?;
        if !preflight::check_runtime_available(self.runner, self.platform, &plan.runtime_probe) {
            return Err(Error::RuntimeMissing {
                runtime: plan.runtime_name.clone(),
            }
            .into());
        }
        self.enter(stage, Stage::RuntimeChecked, reporter);

        self.checkpoint()?;
        let installs = installer::ensure_dependencies(
            self.runner,
            self.platform,
            &plan.install_order(),
            reporter,
        )?;
        self.enter(stage, Stage::DepsInstalled, reporter);

        self.checkpoint()?;
        reporter.launching(&plan.server);
        let server = launcher::launch(self.runner, self.platform, &plan.server)?;
        reporter.launched(&server);
        self.enter(stage, Stage::ServerLaunched, reporter);

        // Fixed pause, not a readiness check.
        reporter.waiting(plan.grace_period);
        if !self.interrupt.sleep(plan.grace_period) {
            return Err(Halt::Interrupted);
        }

        reporter.launching(&plan.client);
        let client = launcher::launch(self.runner, self.platform, &plan.client)?;
        reporter.launched(&client);
        self.enter(stage, Stage::ClientLaunched, reporter);

        self.enter(stage, Stage::Done, reporter);
        Ok(LaunchSummary {
            platform: self.platform,
            installs,
            server,
            client,
        })
    }
}
