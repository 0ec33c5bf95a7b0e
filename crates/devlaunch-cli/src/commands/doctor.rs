use anyhow::Result;
use colored::Colorize;
use std::process::ExitCode;

use devlaunch_core::command::CommandLine;
use devlaunch_core::config::{LaunchConfig, CONFIG_FILE, LOCAL_CONFIG_FILE};
use devlaunch_core::platform::Platform;
use devlaunch_core::preflight;
use devlaunch_core::project::{LaunchPlan, ProjectRoot, SubProject};
use devlaunch_core::runner::SystemRunner;
use devlaunch_core::ui;

struct CheckResult {
    passed: bool,
    message: String,
}

impl CheckResult {
    fn pass(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }
}

fn check_config(root: &ProjectRoot) -> (CheckResult, Option<LaunchConfig>) {
    let has_base = root.join(CONFIG_FILE).exists();
    let has_local = root.join(LOCAL_CONFIG_FILE).exists();

    match LaunchConfig::load(root.path()) {
        Ok(config) => {
            let source = match (has_base, has_local) {
                (false, false) => "no config file, using defaults".to_string(),
                (true, false) => format!("{} valid", CONFIG_FILE),
                (false, true) => format!("{} valid", LOCAL_CONFIG_FILE),
                (true, true) => format!("{} + {} valid", CONFIG_FILE, LOCAL_CONFIG_FILE),
            };
            (CheckResult::pass(source), Some(config))
        }
        Err(e) => (CheckResult::fail(format!("{:#}", e)), None),
    }
}

fn check_tool(
    platform: Platform,
    probe: &CommandLine,
    label: &str,
    install_hint: &str,
) -> CheckResult {
    match preflight::runtime_version(&SystemRunner, platform, probe) {
        Some(version) => CheckResult::pass(format!("{} ({})", label, version)),
        None => CheckResult::fail(format!("{} not found (install: {})", label, install_hint)),
    }
}

fn check_sub_project(project: &SubProject) -> Vec<CheckResult> {
    let dir = project.dir.display();
    if !project.dir.is_dir() {
        return vec![CheckResult::fail(format!(
            "{} directory missing ({})",
            project.role, dir
        ))];
    }

    let deps = if project.is_installed() {
        CheckResult::pass(format!("{} dependencies installed", project.role))
    } else {
        CheckResult::fail(format!(
            "{} dependencies missing (will run: {})",
            project.role, project.install
        ))
    };

    vec![CheckResult::pass(format!("{} directory {}", project.role, dir)), deps]
}

pub fn run() -> Result<ExitCode> {
    let root = ProjectRoot::resolve()?;
    let platform = Platform::current();

    println!("{}", "devlaunch doctor".bold());
    println!("  root      {}", root.path().display());
    println!("  platform  {}", platform);

    ui::section("Configuration");
    let (config_check, config) = check_config(&root);
    print_checks(std::slice::from_ref(&config_check));
    let Some(config) = config else {
        return Ok(ExitCode::FAILURE);
    };
    let plan = LaunchPlan::from_config(root, &config)?;

    ui::section("Tools");
    let mut tool_checks = vec![check_tool(
        platform,
        &plan.runtime_probe,
        &plan.runtime_name,
        &plan.download_url,
    )];
    let installer = plan.client.install.program();
    if installer != plan.runtime_probe.program() {
        let probe = CommandLine::new(installer, &["--version"]);
        tool_checks.push(check_tool(platform, &probe, installer, &plan.download_url));
    }
    print_checks(&tool_checks);

    ui::section("Sub-projects");
    let project_checks: Vec<CheckResult> = [&plan.server, &plan.client]
        .into_iter()
        .flat_map(check_sub_project)
        .collect();
    print_checks(&project_checks);

    let all: Vec<&CheckResult> = std::iter::once(&config_check)
        .chain(tool_checks.iter())
        .chain(project_checks.iter())
        .collect();
    let total = all.len();
    let passed = all.iter().filter(|c| c.passed).count();
    let failed = total - passed;

    println!();
    let summary = format!("{}/{} checks passed", passed, total);
    if failed == 0 {
        println!("{}", summary.green().bold());
    } else {
        println!("{}", summary.yellow().bold());
        println!(
            "{}",
            format!("{} issue(s) found, see above for details", failed).yellow()
        );
    }

    Ok(ExitCode::SUCCESS)
}

fn print_checks(checks: &[CheckResult]) {
    for check in checks {
        if check.passed {
            ui::check_pass(&check.message);
        } else {
            ui::check_fail(&check.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(dir: &std::path::Path) -> LaunchPlan {
        LaunchPlan::from_config(ProjectRoot::new(dir), &LaunchConfig::default()).unwrap()
    }

    #[test]
    fn missing_directory_is_single_failure() {
        let dir = tempfile::tempdir().unwrap();
        let checks = check_sub_project(&plan(dir.path()).server);
        assert_eq!(checks.len(), 1);
        assert!(!checks[0].passed);
        assert!(checks[0].message.starts_with("server directory missing"));
    }

    #[test]
    fn missing_marker_names_install_command() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("client")).unwrap();
        let checks = check_sub_project(&plan(dir.path()).client);
        assert!(checks[0].passed);
        assert!(!checks[1].passed);
        assert!(checks[1].message.contains("npm install"));
    }

    #[test]
    fn installed_project_passes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("server/node_modules")).unwrap();
        let checks = check_sub_project(&plan(dir.path()).server);
        assert!(checks.iter().all(|c| c.passed));
    }

    #[test]
    fn config_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let (check, config) = check_config(&ProjectRoot::new(dir.path()));
        assert!(check.passed);
        assert!(check.message.contains("defaults"));
        assert!(config.is_some());
    }

    #[test]
    fn broken_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[launch\n").unwrap();
        let (check, config) = check_config(&ProjectRoot::new(dir.path()));
        assert!(!check.passed);
        assert!(config.is_none());
    }
}
