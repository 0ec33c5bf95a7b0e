use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::command::CommandLine;
use crate::config::{LaunchConfig, SubProjectConfig};

/// Environment variable that pins the project root.
pub const ROOT_ENV: &str = "DEVLAUNCH_ROOT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Server,
    Client,
}

impl Role {
    pub fn name(self) -> &'static str {
        match self {
            Role::Server => "server",
            Role::Client => "client",
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            Role::Server => 2567,
            Role::Client => 5173,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Absolute directory the sub-project paths hang off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRoot(PathBuf);

impl ProjectRoot {
    /// Canonicalized when possible, without the `\\?\` prefix that cmd.exe
    /// rejects as a working directory.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let path = dunce::canonicalize(&path).unwrap_or(path);
        Self(path)
    }

    /// Pick the root for this run: `DEVLAUNCH_ROOT`, then the executable's
    /// own directory if it holds the sub-projects, then the working directory.
    pub fn resolve() -> Result<Self> {
        let pinned = std::env::var_os(ROOT_ENV).map(PathBuf::from);
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        let cwd = std::env::current_dir().context("cannot determine the working directory")?;
        Ok(Self::resolve_from(pinned, exe_dir, cwd))
    }

    pub fn resolve_from(pinned: Option<PathBuf>, exe_dir: Option<PathBuf>, cwd: PathBuf) -> Self {
        if let Some(path) = pinned {
            tracing::debug!("project root pinned by {}", ROOT_ENV);
            return Self::new(path);
        }
        if let Some(dir) = exe_dir {
            if looks_like_root(&dir) {
                return Self::new(dir);
            }
        }
        Self::new(cwd)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn join(&self, rel: &str) -> PathBuf {
        self.0.join(rel)
    }
}

fn looks_like_root(dir: &Path) -> bool {
    [Role::Server, Role::Client]
        .iter()
        .all(|role| dir.join(role.name()).is_dir())
}

/// One managed application: where it lives and how to install and run it.
#[derive(Debug, Clone)]
pub struct SubProject {
    pub role: Role,
    pub dir: PathBuf,
    pub install_marker: PathBuf,
    pub install: CommandLine,
    pub launch: CommandLine,
    pub port: u16,
}

impl SubProject {
    pub fn is_installed(&self) -> bool {
        self.install_marker.exists()
    }
}

/// Everything one launch run needs, derived once from the root and config.
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    pub root: ProjectRoot,
    pub runtime_name: String,
    pub runtime_probe: CommandLine,
    pub download_url: String,
    pub server: SubProject,
    pub client: SubProject,
    pub grace_period: Duration,
}

impl LaunchPlan {
    pub fn from_config(root: ProjectRoot, config: &LaunchConfig) -> crate::Result<Self> {
        let runtime_probe = CommandLine::from_parts(&config.runtime.command, "runtime.command")?;
        let install =
            CommandLine::from_parts(&config.dependencies.install, "dependencies.install")?;
        let launch = CommandLine::from_parts(&config.launch.command, "launch.command")?;
        if config.dependencies.marker.trim().is_empty() {
            return Err(crate::Error::Config(
                "dependencies.marker must not be empty".to_string(),
            ));
        }

        let sub_project = |role: Role, overrides: &SubProjectConfig| {
            let dir = root.join(overrides.dir.as_deref().unwrap_or(role.name()));
            SubProject {
                role,
                install_marker: dir.join(&config.dependencies.marker),
                dir,
                install: install.clone(),
                launch: launch.clone(),
                port: overrides.port.unwrap_or(role.default_port()),
            }
        };
        let server = sub_project(Role::Server, &config.server);
        let client = sub_project(Role::Client, &config.client);

        Ok(Self {
            runtime_name: config.runtime.name.clone(),
            runtime_probe,
            download_url: config.runtime.download_url.clone(),
            server,
            client,
            grace_period: config.grace_period(),
            root,
        })
    }

    /// Install order: client first, then server.
    pub fn install_order(&self) -> [&SubProject; 2] {
        [&self.client, &self.server]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn role_names_and_ports() {
        assert_eq!(Role::Server.to_string(), "server");
        assert_eq!(Role::Client.to_string(), "client");
        assert_eq!(Role::Client.default_port(), 5173);
        assert_eq!(Role::Server.default_port(), 2567);
    }

    // ── Root resolution ───────────────────────────────────────────────

    #[test]
    fn pinned_root_wins() {
        let pinned = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let root = ProjectRoot::resolve_from(
            Some(pinned.path().to_path_buf()),
            Some(other.path().to_path_buf()),
            other.path().to_path_buf(),
        );
        assert_eq!(root, ProjectRoot::new(pinned.path()));
    }

    #[test]
    fn exe_dir_used_when_it_holds_both_subprojects() {
        let exe_dir = tempfile::tempdir().unwrap();
        fs::create_dir(exe_dir.path().join("client")).unwrap();
        fs::create_dir(exe_dir.path().join("server")).unwrap();
        let cwd = tempfile::tempdir().unwrap();

        let root = ProjectRoot::resolve_from(
            None,
            Some(exe_dir.path().to_path_buf()),
            cwd.path().to_path_buf(),
        );
        assert_eq!(root, ProjectRoot::new(exe_dir.path()));
    }

    #[test]
    fn falls_back_to_cwd() {
        let exe_dir = tempfile::tempdir().unwrap();
        fs::create_dir(exe_dir.path().join("client")).unwrap();
        let cwd = tempfile::tempdir().unwrap();

        let root = ProjectRoot::resolve_from(
            None,
            Some(exe_dir.path().to_path_buf()),
            cwd.path().to_path_buf(),
        );
        assert_eq!(root, ProjectRoot::new(cwd.path()));
        assert!(root.path().is_absolute());
    }

    #[test]
    fn canonical_root_has_no_verbatim_prefix() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        let root = ProjectRoot::new(dir.path().join("nested").join(".."));

        assert!(!root.path().to_string_lossy().starts_with(r"\\?\"));
        assert!(!root.path().ends_with(".."));
        assert!(root.path().is_absolute());

        let plan = LaunchPlan::from_config(root, &LaunchConfig::default()).unwrap();
        assert!(!plan.server.dir.to_string_lossy().starts_with(r"\\?\"));
    }

    // ── Plan construction ─────────────────────────────────────────────

    #[test]
    fn plan_from_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let root = ProjectRoot::new(dir.path());
        let plan = LaunchPlan::from_config(root.clone(), &LaunchConfig::default()).unwrap();

        assert_eq!(plan.server.dir, root.join("server"));
        assert_eq!(plan.client.install_marker, root.join("client").join("node_modules"));
        assert_eq!(plan.server.launch.to_string(), "npm run dev");
        assert_eq!(plan.client.install.to_string(), "npm install");
        assert_eq!(plan.runtime_probe.to_string(), "node --version");
        assert_eq!(plan.client.port, 5173);
        assert_eq!(plan.grace_period, Duration::from_secs(3));

        let order: Vec<Role> = plan.install_order().iter().map(|p| p.role).collect();
        assert_eq!(order, vec![Role::Client, Role::Server]);
    }

    #[test]
    fn plan_applies_role_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LaunchConfig::default();
        config.server.dir = Some("api".to_string());
        config.server.port = Some(8080);

        let plan = LaunchPlan::from_config(ProjectRoot::new(dir.path()), &config).unwrap();
        assert!(plan.server.dir.ends_with("api"));
        assert_eq!(plan.server.port, 8080);
        assert!(plan.client.dir.ends_with("client"));
    }

    #[test]
    fn plan_rejects_empty_launch_command() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LaunchConfig::default();
        config.launch.command.clear();

        let err = LaunchPlan::from_config(ProjectRoot::new(dir.path()), &config).unwrap_err();
        assert!(err.to_string().contains("launch.command"));
    }

    #[test]
    fn plan_rejects_empty_marker() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LaunchConfig::default();
        config.dependencies.marker = String::new();
        assert!(LaunchPlan::from_config(ProjectRoot::new(dir.path()), &config).is_err());
    }

    #[test]
    fn is_installed_tracks_marker() {
        let dir = tempfile::tempdir().unwrap();
        let root = ProjectRoot::new(dir.path());
        let plan = LaunchPlan::from_config(root, &LaunchConfig::default()).unwrap();
        assert!(!plan.client.is_installed());
        fs::create_dir_all(&plan.client.install_marker).unwrap();
        assert!(plan.client.is_installed());
        assert!(!plan.server.is_installed());
    }
}
