//! Module descriptor models.
//!
//! The host normally owns model building; this module defines the small
//! slice of it the extension needs (`ModelParser`) plus a `roxmltree`
//! based POM reader and a reactor loader built on top of it.

pub mod cache;
pub mod pom;
pub mod reactor;

pub use cache::ReactorModelCache;
pub use pom::PomParser;
pub use reactor::load_reactor;

use std::path::{Path, PathBuf};

use anyhow::Result;
use thiserror::Error;

use crate::core::{BuildLayout, Coordinate, Module, ModuleBuilder, Plugin, RemoteRepository};
use crate::util::config::Properties;

/// Conventional descriptor file name.
pub const DESCRIPTOR_FILE: &str = "pom.xml";

/// How strictly a descriptor is validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationLevel {
    /// Only `artifactId` is required; unresolvable groupId/version become empty.
    Minimal,
    /// groupId, artifactId and version must all resolve.
    #[default]
    Strict,
}

/// Options for one parse.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub validation: ValidationLevel,
    /// Read build plugins and their configuration trees.
    pub process_plugins: bool,
    pub active_profiles: Vec<String>,
    /// User properties, visible to interpolation.
    pub properties: Properties,
}

impl ParseOptions {
    /// Minimal validation, plugins disabled.
    pub fn minimal() -> Self {
        ParseOptions {
            validation: ValidationLevel::Minimal,
            ..ParseOptions::default()
        }
    }

    /// Enable plugin processing.
    pub fn with_plugins(mut self) -> Self {
        self.process_plugins = true;
        self
    }

    /// The options used for ancestor descriptors: minimal, no plugins.
    pub fn for_ancestors(&self) -> Self {
        ParseOptions {
            validation: ValidationLevel::Minimal,
            process_plugins: false,
            active_profiles: self.active_profiles.clone(),
            properties: self.properties.clone(),
        }
    }
}

/// Reference from a descriptor to its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    /// Relative location of the parent; empty disables the lookup.
    pub relative_path: String,
}

impl ParentRef {
    /// Where the parent descriptor should be, seen from `child_dir`.
    pub fn descriptor_from(&self, child_dir: &Path) -> Option<PathBuf> {
        if self.relative_path.trim().is_empty() {
            return None;
        }
        let path = child_dir.join(self.relative_path.trim());
        if path.is_dir() {
            Some(path.join(DESCRIPTOR_FILE))
        } else {
            Some(path)
        }
    }
}

/// A parsed descriptor with inheritance and interpolation applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedModel {
    pub descriptor: PathBuf,
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub packaging: String,
    pub parent: Option<ParentRef>,
    /// Aggregated module paths, relative to the descriptor's directory.
    pub modules: Vec<String>,
    pub properties: Properties,
    pub build: BuildLayout,
    pub managed_dependencies: Vec<Coordinate>,
    pub repositories: Vec<RemoteRepository>,
    /// Empty unless parsed with `process_plugins`.
    pub plugins: Vec<Plugin>,
}

impl ParsedModel {
    /// Directory holding the descriptor.
    pub fn base_dir(&self) -> &Path {
        self.descriptor.parent().unwrap_or_else(|| Path::new("."))
    }

    /// `g:a:v`.
    pub fn id(&self) -> String {
        crate::core::coordinate::project_key(&self.group_id, &self.artifact_id, &self.version)
    }

    /// A module builder carrying everything but tree links.
    pub fn module_builder(&self) -> ModuleBuilder {
        let mut builder = Module::builder(
            self.group_id.clone(),
            self.artifact_id.clone(),
            self.version.clone(),
            self.base_dir().to_path_buf(),
        )
        .packaging(self.packaging.clone())
        .descriptor(self.descriptor.clone())
        .build_layout(self.build.clone())
        .properties(self.properties.clone());

        for coord in &self.managed_dependencies {
            builder = builder.managed_dependency(coord.clone());
        }
        for repository in &self.repositories {
            builder = builder.repository(repository.clone());
        }
        builder
    }
}

/// Minimal model-building capability.
pub trait ModelParser: Send + Sync {
    /// Parse one descriptor.
    fn parse(
        &self,
        descriptor: &Path,
        options: &ParseOptions,
        cache: &ReactorModelCache<ParsedModel>,
    ) -> Result<ParsedModel>;

    /// The descriptor followed by every locally reachable ancestor.
    ///
    /// Ancestors are parsed with `options.for_ancestors()`.
    fn ancestry(
        &self,
        descriptor: &Path,
        options: &ParseOptions,
        cache: &ReactorModelCache<ParsedModel>,
    ) -> Result<Vec<ParsedModel>>;
}

/// Errors produced while reading descriptors.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("{path}: missing required element `{element}`")]
    MissingElement { path: String, element: String },

    #[error("{path}: parent chain is cyclic or too deep")]
    ParentCycle { path: String },

    #[error("module `{module}` declared in {path} has no descriptor")]
    MissingModule { path: String, module: String },
}
