//! Configuration for the workspace extension.
//!
//! Flags are read from three places, highest precedence first:
//! - User properties (`-Dimh.workspace=true`)
//! - Module properties (`<properties>` of the module, or of the root module
//!   for session-wide settings such as the overlay path)
//! - Project config file: `.mvn/imh.toml` under the root directory
//!
//! A flag is enabled only when its value is exactly `true`. Everything is
//! resolved once into an `ImhConfig` at session start.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::Module;

/// String-keyed property bag (user or module properties).
pub type Properties = BTreeMap<String, String>;

/// Enables the workspace resolver.
pub const WORKSPACE_FLAG: &str = "imh.workspace";

/// Legacy alias of `WORKSPACE_FLAG`.
pub const WORKSPACE_LEGACY_FLAG: &str = "imh.ext";

/// Enables the overlay repository. As a root-module property, the overlay path.
pub const REPOSITORY_FLAG: &str = "imh.repository";

/// Enables placeholder substitution.
pub const PLACEHOLDERS_FLAG: &str = "imh.placeholders";

/// Lets the workspace resolver hand out compiled-output directories.
pub const DIRECTORY_FALLBACK_FLAG: &str = "imh.workspace.directories";

/// `fail-open` or `fail-closed`.
pub const STALENESS_POLICY_PROPERTY: &str = "imh.workspace.staleness";

/// Directory marking the root of a module tree.
pub const MARKER_DIR: &str = ".mvn";

/// Name of the project config file inside `MARKER_DIR`.
pub const CONFIG_FILE_NAME: &str = "imh.toml";

/// What to assume when the staleness scan hits an I/O error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StalenessPolicy {
    /// Treat the packaged file as up to date.
    #[default]
    FailOpen,
    /// Treat the packaged file as stale.
    FailClosed,
}

impl FromStr for StalenessPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fail-open" => Ok(StalenessPolicy::FailOpen),
            "fail-closed" => Ok(StalenessPolicy::FailClosed),
            other => bail!(
                "unknown staleness policy `{}` (expected `fail-open` or `fail-closed`)",
                other
            ),
        }
    }
}

impl fmt::Display for StalenessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StalenessPolicy::FailOpen => write!(f, "fail-open"),
            StalenessPolicy::FailClosed => write!(f, "fail-closed"),
        }
    }
}

/// Resolved extension configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImhConfig {
    /// Resolve workspace modules from build outputs
    pub workspace: bool,

    /// Route workspace artifacts into the overlay repository
    pub repository: bool,

    /// Substitute `$D{...}` placeholders in plugin configuration
    pub placeholders: bool,

    /// Accept compiled-output directories as artifacts
    pub directory_fallback: bool,

    /// Overlay repository directory (overrides the root build directory default)
    pub overlay_path: Option<PathBuf>,

    /// Staleness scan I/O error policy
    pub staleness: StalenessPolicy,
}

impl ImhConfig {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Resolve the session configuration.
    ///
    /// `root_properties` are the root module's properties when already
    /// known; `file` holds the project config file defaults.
    pub fn resolve(
        user: &Properties,
        root_properties: Option<&Properties>,
        file: ImhConfig,
    ) -> Self {
        let mut config = file;

        if let Some(props) = root_properties {
            if let Some(path) = props.get(REPOSITORY_FLAG).filter(|p| !p.is_empty()) {
                config.overlay_path = Some(PathBuf::from(path));
            }
            apply_policy(props, &mut config);
        }

        config.workspace |= is_true(user, WORKSPACE_FLAG) || is_true(user, WORKSPACE_LEGACY_FLAG);
        config.repository |= is_true(user, REPOSITORY_FLAG);
        config.placeholders |= is_true(user, PLACEHOLDERS_FLAG);
        config.directory_fallback |= is_true(user, DIRECTORY_FALLBACK_FLAG);
        apply_policy(user, &mut config);

        config
    }

    /// Whether placeholders are substituted for `module`.
    pub fn placeholders_enabled_for(&self, module: &Module) -> bool {
        self.placeholders || module.property(PLACEHOLDERS_FLAG) == Some("true")
    }

    /// Whether `module` may resolve to its compiled-output directory.
    pub fn directory_fallback_enabled_for(&self, module: &Module) -> bool {
        self.directory_fallback || module.property(DIRECTORY_FALLBACK_FLAG) == Some("true")
    }

    /// The overlay directory for a session rooted at `root`.
    ///
    /// The root module's `imh.repository` property wins over the config
    /// file; the default is `<root build dir>/local-repo`.
    pub fn overlay_dir_for(&self, root: &Module) -> PathBuf {
        if let Some(path) = root.property(REPOSITORY_FLAG).filter(|p| !p.is_empty()) {
            tracing::info!(
                "[IMH] using overlay repository from root project properties: {}",
                path
            );
            return PathBuf::from(path);
        }
        if let Some(path) = &self.overlay_path {
            tracing::info!("[IMH] using configured overlay repository: {}", path.display());
            return path.clone();
        }
        let path = root.build().directory.join("local-repo");
        tracing::info!(
            "[IMH] using root project target folder as overlay repository: {}",
            path.display()
        );
        path
    }
}

/// Project config path (`<root>/.mvn/imh.toml`).
pub fn project_config_path(root_dir: &Path) -> PathBuf {
    root_dir.join(MARKER_DIR).join(CONFIG_FILE_NAME)
}

fn is_true(props: &Properties, key: &str) -> bool {
    props.get(key).map(String::as_str) == Some("true")
}

fn apply_policy(props: &Properties, config: &mut ImhConfig) {
    if let Some(value) = props.get(STALENESS_POLICY_PROPERTY) {
        match value.parse() {
            Ok(policy) => config.staleness = policy,
            Err(e) => tracing::warn!("Ignoring {}: {}", STALENESS_POLICY_PROPERTY, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn props(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_are_inert() {
        let config = ImhConfig::resolve(&Properties::new(), None, ImhConfig::default());
        assert!(!config.workspace);
        assert!(!config.repository);
        assert!(!config.placeholders);
        assert!(!config.directory_fallback);
        assert_eq!(config.staleness, StalenessPolicy::FailOpen);
    }

    #[test]
    fn test_user_flags() {
        let user = props(&[
            ("imh.ext", "true"),
            ("imh.repository", "true"),
            ("imh.placeholders", "yes"),
        ]);
        let config = ImhConfig::resolve(&user, None, ImhConfig::default());
        assert!(config.workspace);
        assert!(config.repository);
        assert!(!config.placeholders);
    }

    #[test]
    fn test_precedence() {
        let file = ImhConfig {
            staleness: StalenessPolicy::FailClosed,
            overlay_path: Some(PathBuf::from("/from/file")),
            ..ImhConfig::default()
        };
        let root = props(&[("imh.repository", "/from/root")]);
        let user = props(&[("imh.workspace.staleness", "fail-open")]);

        let config = ImhConfig::resolve(&user, Some(&root), file);
        assert_eq!(config.staleness, StalenessPolicy::FailOpen);
        assert_eq!(config.overlay_path, Some(PathBuf::from("/from/root")));
    }

    #[test]
    fn test_module_level_switches() {
        let module = Module::builder("g", "a", "1", "/w")
            .property(PLACEHOLDERS_FLAG, "true")
            .build();
        let config = ImhConfig::default();
        assert!(config.placeholders_enabled_for(&module));
        assert!(!config.directory_fallback_enabled_for(&module));
    }

    #[test]
    fn test_overlay_dir_default() {
        let root = Module::builder("g", "root", "1", "/w").build();
        let config = ImhConfig::default();
        assert_eq!(
            config.overlay_dir_for(&root),
            PathBuf::from("/w/target/local-repo")
        );
    }

    #[test]
    fn test_load_config_file() {
        let tmp = TempDir::new().unwrap();
        let path = project_config_path(tmp.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            "workspace = true\nstaleness = \"fail-closed\"\noverlay_path = \"/tmp/overlay\"\n",
        )
        .unwrap();

        let config = ImhConfig::load_or_default(&path);
        assert!(config.workspace);
        assert_eq!(config.staleness, StalenessPolicy::FailClosed);

        std::fs::write(&path, "workspace = [").unwrap();
        assert_eq!(ImhConfig::load_or_default(&path), ImhConfig::default());
    }
}
