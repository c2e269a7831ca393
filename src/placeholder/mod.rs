//! Dependency placeholders in plugin configuration.
//!
//! A placeholder `$D{groupId:artifactId[:version[:packaging[:classifier]]]}`
//! inside a configuration value is replaced by the absolute path of the
//! resolved artifact. A trailing `,`, `;` or `:` resolves the dependency
//! transitively and joins every file with that character.

pub mod engine;
pub mod token;

pub use engine::PlaceholderEngine;
pub use token::DependencySpec;

use std::path::PathBuf;

use anyhow::Result;
use thiserror::Error;

use crate::core::{Coordinate, RemoteRepository};

/// A dependency graph request rooted at one coordinate.
#[derive(Debug, Clone)]
pub struct CollectRequest {
    pub root: Coordinate,
    /// Managed dependencies of the requesting module.
    pub managed: Vec<Coordinate>,
    pub repositories: Vec<RemoteRepository>,
}

/// A node of a resolved dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyNode {
    pub coordinate: Coordinate,
    /// Local file of the resolved artifact.
    pub file: Option<PathBuf>,
    pub children: Vec<DependencyNode>,
}

impl DependencyNode {
    pub fn new(coordinate: Coordinate, file: impl Into<PathBuf>) -> Self {
        DependencyNode {
            coordinate,
            file: Some(file.into()),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: DependencyNode) -> Self {
        self.children.push(child);
        self
    }

    /// Every node below this one, pre-order.
    pub fn descendants(&self) -> Vec<&DependencyNode> {
        let mut out = Vec::new();
        for child in &self.children {
            out.push(child);
            out.extend(child.descendants());
        }
        out
    }
}

/// Resolves a dependency graph; supplied by the host.
pub trait DependencyGraphResolver: Send + Sync {
    fn resolve(&self, request: &CollectRequest) -> Result<DependencyNode>;
}

/// Placeholder failures. Each one names the module and the raw token.
#[derive(Debug, Error)]
pub enum PlaceholderError {
    #[error("{module}: invalid dependency specified: {token}")]
    Syntax { module: String, token: String },

    #[error("{module}: no version was specified for artifact {token}")]
    VersionMissing { module: String, token: String },

    #[error("{module}: artifact {token} is built in this workspace, placeholders cannot refer to workspace modules")]
    WorkspaceConflict { module: String, token: String },

    #[error("{module}: failed to resolve dependency {token}")]
    Resolution {
        module: String,
        token: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{module}: {artifact} (from {token}) was resolved without a file")]
    MissingFile {
        module: String,
        token: String,
        artifact: String,
    },
}

impl PlaceholderError {
    /// Identity of the module whose configuration failed.
    pub fn module(&self) -> &str {
        match self {
            PlaceholderError::Syntax { module, .. }
            | PlaceholderError::VersionMissing { module, .. }
            | PlaceholderError::WorkspaceConflict { module, .. }
            | PlaceholderError::Resolution { module, .. }
            | PlaceholderError::MissingFile { module, .. } => module,
        }
    }

    /// The raw placeholder text.
    pub fn token(&self) -> &str {
        match self {
            PlaceholderError::Syntax { token, .. }
            | PlaceholderError::VersionMissing { token, .. }
            | PlaceholderError::WorkspaceConflict { token, .. }
            | PlaceholderError::Resolution { token, .. }
            | PlaceholderError::MissingFile { token, .. } => token,
        }
    }
}
