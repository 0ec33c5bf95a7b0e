use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE: &str = "devlaunch.toml";
pub const LOCAL_CONFIG_FILE: &str = "devlaunch.local.toml";

/// Launcher settings read from `devlaunch.toml` in the project root.
///
/// Every section is optional; a project without the file gets the defaults
/// for a Node.js client/server pair.
#[derive(Debug, Serialize, Deserialize)]
pub struct LaunchConfig {
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub dependencies: DependenciesConfig,
    #[serde(default)]
    pub launch: LaunchSection,
    #[serde(default)]
    pub server: SubProjectConfig,
    #[serde(default)]
    pub client: SubProjectConfig,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            runtime: RuntimeConfig::default(),
            dependencies: DependenciesConfig::default(),
            launch: LaunchSection::default(),
            server: SubProjectConfig::default(),
            client: SubProjectConfig::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Human-readable name used in messages, e.g. "Node.js".
    #[serde(default = "default_runtime_name")]
    pub name: String,
    /// Version query used as the availability probe.
    #[serde(default = "default_runtime_command")]
    pub command: Vec<String>,
    #[serde(default = "default_download_url")]
    pub download_url: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            name: default_runtime_name(),
            command: default_runtime_command(),
            download_url: default_download_url(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DependenciesConfig {
    #[serde(default = "default_install_command")]
    pub install: Vec<String>,
    /// Directory inside each sub-project whose presence means "installed".
    #[serde(default = "default_marker")]
    pub marker: String,
}

impl Default for DependenciesConfig {
    fn default() -> Self {
        Self {
            install: default_install_command(),
            marker: default_marker(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LaunchSection {
    #[serde(default = "default_launch_command")]
    pub command: Vec<String>,
    /// Pause between starting the server and starting the client.
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,
}

impl Default for LaunchSection {
    fn default() -> Self {
        Self {
            command: default_launch_command(),
            grace_period_ms: default_grace_period_ms(),
        }
    }
}

/// Per-role overrides. Unset fields fall back to the role's defaults
/// (see [`crate::project::Role`]).
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SubProjectConfig {
    #[serde(default)]
    pub dir: Option<String>,
    /// Informational only; never probed.
    #[serde(default)]
    pub port: Option<u16>,
}

fn default_runtime_name() -> String {
    "Node.js".to_string()
}

fn default_runtime_command() -> Vec<String> {
    vec!["node".to_string(), "--version".to_string()]
}

fn default_download_url() -> String {
    "https://nodejs.org/".to_string()
}

fn default_install_command() -> Vec<String> {
    vec!["npm".to_string(), "install".to_string()]
}

fn default_marker() -> String {
    "node_modules".to_string()
}

fn default_launch_command() -> Vec<String> {
    vec!["npm".to_string(), "run".to_string(), "dev".to_string()]
}

fn default_grace_period_ms() -> u64 {
    3000
}

/// Deep-merge two TOML values. The `override_val` takes precedence over `base`.
/// Tables are merged recursively; all other types are replaced.
fn deep_merge(base: toml::Value, override_val: toml::Value) -> toml::Value {
    match (base, override_val) {
        (toml::Value::Table(mut base_table), toml::Value::Table(override_table)) => {
            for (key, override_v) in override_table {
                let merged = match base_table.remove(&key) {
                    Some(base_v) => deep_merge(base_v, override_v),
                    None => override_v,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_base, override_val) => override_val,
    }
}

fn read_toml(path: &Path) -> Result<toml::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("{} is not valid TOML", path.display()))
}

impl LaunchConfig {
    /// Load `devlaunch.toml` from `dir`, then merge `devlaunch.local.toml`
    /// over it. Missing files fall back to defaults.
    pub fn load(dir: &Path) -> Result<Self> {
        let base_path = dir.join(CONFIG_FILE);
        let local_path = dir.join(LOCAL_CONFIG_FILE);

        let base_value = if base_path.exists() {
            read_toml(&base_path)?
        } else {
            toml::Value::Table(toml::Table::new())
        };

        let merged = if local_path.exists() {
            tracing::debug!("merging {}", local_path.display());
            deep_merge(base_value, read_toml(&local_path)?)
        } else {
            base_value
        };

        let config: LaunchConfig = merged
            .try_into()
            .with_context(|| format!("invalid settings in {}", dir.join(CONFIG_FILE).display()))?;
        Ok(config)
    }

    pub fn grace_period(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.launch.grace_period_ms)
    }
}
