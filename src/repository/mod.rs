//! Local artifact repositories.
//!
//! A `LocalRepositoryManager` maps coordinates and metadata to paths
//! relative to its base directory and tracks what has been installed.
//! `OverlayRepositoryRouter` combines two managers into one logical
//! repository: workspace artifacts go to an overlay area that can be wiped
//! per build, everything else to the long-lived shared cache.

pub mod overlay;
pub mod project_aware;
pub mod simple;

pub use overlay::OverlayRepositoryRouter;
pub use project_aware::ProjectAwareRepository;
pub use simple::SimpleLocalRepositoryManager;

use std::path::{Path, PathBuf};

use crate::core::{Coordinate, Metadata, RemoteRepository};

/// Lookup of an artifact in a local repository.
#[derive(Debug, Clone)]
pub struct LocalArtifactRequest {
    pub coordinate: Coordinate,
    /// Remote repositories the artifact may have come from.
    pub repositories: Vec<RemoteRepository>,
    pub context: String,
}

impl LocalArtifactRequest {
    pub fn new(coordinate: Coordinate) -> Self {
        LocalArtifactRequest {
            coordinate,
            repositories: Vec::new(),
            context: String::new(),
        }
    }
}

/// Outcome of a `LocalArtifactRequest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalArtifactResult {
    /// Absolute path of the file, when present.
    pub file: Option<PathBuf>,
    /// Whether the file may be used for the request.
    pub available: bool,
}

impl LocalArtifactResult {
    pub fn missing() -> Self {
        LocalArtifactResult {
            file: None,
            available: false,
        }
    }
}

/// Record of an artifact installed into (or downloaded to) a local repository.
#[derive(Debug, Clone)]
pub struct LocalArtifactRegistration {
    pub coordinate: Coordinate,
    /// `None` for locally installed artifacts.
    pub repository: Option<RemoteRepository>,
    pub contexts: Vec<String>,
}

impl LocalArtifactRegistration {
    pub fn installed(coordinate: Coordinate) -> Self {
        LocalArtifactRegistration {
            coordinate,
            repository: None,
            contexts: Vec::new(),
        }
    }
}

/// Lookup of metadata in a local repository.
#[derive(Debug, Clone)]
pub struct LocalMetadataRequest {
    pub metadata: Metadata,
    /// `None` for locally installed metadata.
    pub repository: Option<RemoteRepository>,
    pub context: String,
}

/// Outcome of a `LocalMetadataRequest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMetadataResult {
    pub file: Option<PathBuf>,
}

/// Record of metadata written to a local repository.
#[derive(Debug, Clone)]
pub struct LocalMetadataRegistration {
    pub metadata: Metadata,
    pub repository: Option<RemoteRepository>,
    pub contexts: Vec<String>,
}

/// A local repository.
///
/// Every `path_for_*` result is relative to `base_dir`.
pub trait LocalRepositoryManager: Send + Sync {
    fn base_dir(&self) -> &Path;

    fn path_for_local_artifact(&self, coord: &Coordinate) -> PathBuf;

    fn path_for_remote_artifact(
        &self,
        coord: &Coordinate,
        repository: &RemoteRepository,
        context: &str,
    ) -> PathBuf;

    fn path_for_local_metadata(&self, metadata: &Metadata) -> PathBuf;

    fn path_for_remote_metadata(
        &self,
        metadata: &Metadata,
        repository: &RemoteRepository,
        context: &str,
    ) -> PathBuf;

    fn find_artifact(&self, request: &LocalArtifactRequest) -> LocalArtifactResult;

    fn add_artifact(&self, registration: &LocalArtifactRegistration);

    fn find_metadata(&self, request: &LocalMetadataRequest) -> LocalMetadataResult;

    fn add_metadata(&self, registration: &LocalMetadataRegistration);
}
