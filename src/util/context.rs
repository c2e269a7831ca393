//! Process-wide context for the command line.
//!
//! Holds the working directory and the location of the shared local
//! repository (`~/.m2/repository` unless overridden).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;

use crate::model::DESCRIPTOR_FILE;

/// Environment variable overriding the shared local repository.
pub const LOCAL_REPOSITORY_ENV: &str = "IMH_LOCAL_REPOSITORY";

/// Paths the commands work from.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    cwd: PathBuf,
    local_repository: PathBuf,
}

impl GlobalContext {
    /// Create a context for the current process.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        let local_repository = match std::env::var_os(LOCAL_REPOSITORY_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => default_local_repository()?,
        };
        Ok(GlobalContext {
            cwd,
            local_repository,
        })
    }

    /// Create a context with explicit paths.
    pub fn with_paths(cwd: impl Into<PathBuf>, local_repository: impl Into<PathBuf>) -> Self {
        GlobalContext {
            cwd: cwd.into(),
            local_repository: local_repository.into(),
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn local_repository(&self) -> &Path {
        &self.local_repository
    }

    /// Find the nearest descriptor from the working directory upward.
    pub fn find_descriptor(&self) -> Option<PathBuf> {
        self.cwd
            .ancestors()
            .map(|dir| dir.join(DESCRIPTOR_FILE))
            .find(|candidate| candidate.is_file())
    }
}

fn default_local_repository() -> Result<PathBuf> {
    let dirs = BaseDirs::new().context("failed to determine home directory")?;
    Ok(dirs.home_dir().join(".m2").join("repository"))
}
