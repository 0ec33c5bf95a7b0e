use anyhow::Result;
use colored::Colorize;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::process::ExitCode;
use std::time::Duration;

use devlaunch_core::config::LaunchConfig;
use devlaunch_core::error::Error;
use devlaunch_core::interrupt::Interrupt;
use devlaunch_core::launcher::DetachedProcess;
use devlaunch_core::orchestrator::{LaunchSummary, Orchestrator, Outcome, Stage};
use devlaunch_core::platform::Platform;
use devlaunch_core::project::{LaunchPlan, ProjectRoot, SubProject};
use devlaunch_core::report::Reporter;
use devlaunch_core::runner::SystemRunner;
use devlaunch_core::ui;

/// How long to wait for the orchestration thread after Ctrl+C.
const INTERRUPT_GRACE: Duration = Duration::from_secs(2);

/// How long a failed run waits for a Ctrl+C that is already on its way.
const SIGNAL_SETTLE: Duration = Duration::from_millis(250);

pub fn run() -> Result<ExitCode> {
    let root = ProjectRoot::resolve()?;
    let config = LaunchConfig::load(root.path())?;
    let plan = LaunchPlan::from_config(root, &config)?;
    let platform = Platform::current();
    tracing::debug!(%platform, root = %plan.root.path().display(), "launch plan ready");

    print_banner(&plan);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;
    let interrupt = Interrupt::new();
    let worker = interrupt.clone();
    let work_plan = plan.clone();
    let work = move || {
        let mut reporter = ConsoleReporter::new(&work_plan);
        ui::step(&format!("Checking {}...", work_plan.runtime_name));
        Orchestrator::new(&SystemRunner, platform, &work_plan, worker).run(&mut reporter)
    };
    let result = runtime.block_on(supervise(interrupt, work, tokio::signal::ctrl_c()));
    // A blocking step still running after an interrupt must not hold the exit.
    runtime.shutdown_background();

    let code = match result? {
        Some(outcome) => report(&plan, outcome),
        None => {
            print_interrupted();
            0
        }
    };
    Ok(ExitCode::from(code))
}

/// Whichever finished first: the run or the Ctrl+C listener.
enum Race {
    Finished(Outcome),
    Signalled,
    NoListener(io::Error),
}

/// Run `work` on a blocking thread while listening for `signal`.
/// `None` means the run did not wind down within the interrupt grace.
async fn supervise<W, S>(interrupt: Interrupt, work: W, signal: S) -> Result<Option<Outcome>>
where
    W: FnOnce() -> Outcome + Send + 'static,
    S: Future<Output = io::Result<()>>,
{
    let mut task = tokio::task::spawn_blocking(work);
    tokio::pin!(signal);

    let race = tokio::select! {
        joined = &mut task => Race::Finished(joined?),
        received = signal.as_mut() => match received {
            Ok(()) => Race::Signalled,
            Err(e) => Race::NoListener(e),
        },
    };

    match race {
        Race::Finished(outcome) => Ok(Some(settle(outcome, signal).await)),
        Race::NoListener(e) => {
            tracing::warn!("cannot listen for Ctrl+C: {}", e);
            Ok(Some(task.await?))
        }
        Race::Signalled => {
            interrupt.trigger();
            match tokio::time::timeout(INTERRUPT_GRACE, task).await {
                Ok(joined) => Ok(Some(as_interrupted(joined?))),
                Err(_) => Ok(None),
            }
        }
    }
}

/// Ctrl+C also kills a foreground install, and that failure can reach the
/// orchestrator before the listener has woken up. A failure followed by the
/// signal within [`SIGNAL_SETTLE`] is an interrupt.
async fn settle<S>(outcome: Outcome, signal: Pin<&mut S>) -> Outcome
where
    S: Future<Output = io::Result<()>>,
{
    if !matches!(outcome, Outcome::Failed { .. }) {
        return outcome;
    }
    match tokio::time::timeout(SIGNAL_SETTLE, signal).await {
        Ok(Ok(())) => as_interrupted(outcome),
        _ => outcome,
    }
}

/// After Ctrl+C, a failed step is the signal's doing.
fn as_interrupted(outcome: Outcome) -> Outcome {
    match outcome {
        Outcome::Failed { stage, error } => {
            tracing::debug!(%stage, "failure caused by Ctrl+C: {}", error);
            Outcome::Interrupted { stage }
        }
        other => other,
    }
}

fn report(plan: &LaunchPlan, outcome: Outcome) -> u8 {
    let code = outcome.exit_code() as u8;
    match outcome {
        Outcome::Done(summary) => print_summary(plan, &summary),
        Outcome::Interrupted { stage } => {
            tracing::debug!(%stage, "interrupted");
            print_interrupted();
        }
        Outcome::Failed { stage, error } => {
            tracing::debug!(%stage, "launch failed");
            ui::error(&error.to_string());
            match error {
                Error::RuntimeMissing { .. } => {
                    let hint = format!("Download {} from {}", plan.runtime_name, plan.download_url);
                    ui::warn(&hint);
                }
                Error::Launch { .. } if stage == Stage::ServerLaunched => {
                    ui::warn("The server was already started and is still running.");
                }
                _ => {}
            }
        }
    }
    code
}

fn print_banner(plan: &LaunchPlan) {
    let title = format!("devlaunch {}", env!("CARGO_PKG_VERSION"));
    println!("{}", title.bold().magenta());
    println!(
        "{}",
        format!(
            "  client http://localhost:{}  ·  server http://localhost:{}",
            plan.client.port, plan.server.port
        )
        .magenta()
    );
    println!();
}

fn print_summary(plan: &LaunchPlan, summary: &LaunchSummary) {
    ui::success("Client and server are starting up.");

    ui::section("Processes");
    let started = [(&plan.server, &summary.server), (&plan.client, &summary.client)];
    for (project, process) in started {
        let url = format!("http://localhost:{}", project.port).cyan();
        match summary.platform {
            // the pid belongs to the `start` shell, which has already exited
            Platform::Windows => println!("  {:<7} {}", project.role, url),
            Platform::Posix => println!("  {:<7} pid {:<8} {}", project.role, process.pid, url),
        }
    }

    ui::section("Notes");
    ui::info("Ports are the usual defaults; the launcher does not wait for them.");
    ui::info("Each dev server reports its own startup errors.");
    println!();
    ui::warn(summary.platform.stop_hint());
}

fn print_interrupted() {
    println!();
    ui::warn("Interrupted, exiting. Processes already started keep running.");
}

/// Prints orchestration progress as it happens.
struct ConsoleReporter {
    runtime_name: String,
    marker: String,
}

impl ConsoleReporter {
    fn new(plan: &LaunchPlan) -> Self {
        let marker = plan
            .client
            .install_marker
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            runtime_name: plan.runtime_name.clone(),
            marker,
        }
    }
}

impl Reporter for ConsoleReporter {
    fn stage(&mut self, stage: Stage) {
        if stage == Stage::RuntimeChecked {
            ui::check_pass(&format!("{} found", self.runtime_name));
            ui::step("Checking project dependencies...");
        }
    }

    fn installing(&mut self, project: &SubProject) {
        ui::step(&format!(
            "Installing {} dependencies ({})...",
            project.role, project.install
        ));
    }

    fn install_skipped(&mut self, project: &SubProject) {
        ui::skipped(
            &format!("{} dependencies", project.role),
            &format!("{} present", self.marker),
        );
    }

    fn launching(&mut self, project: &SubProject) {
        ui::step(&format!("Starting {} ({})...", project.role, project.launch));
    }

    fn launched(&mut self, process: &DetachedProcess) {
        ui::started(&process.role.to_string(), &format!("pid {}", process.pid));
    }

    fn waiting(&mut self, grace: Duration) {
        if !grace.is_zero() {
            let secs = grace.as_secs_f32();
            ui::info(&format!("Giving the server {:.1}s to boot", secs));
        }
    }
}
