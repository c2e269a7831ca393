//! Filesystem-backed local repository with the default Maven layout.

use std::path::{Path, PathBuf};

use dashmap::DashSet;

use crate::core::{Coordinate, Metadata, RemoteRepository};
use crate::repository::{
    LocalArtifactRegistration, LocalArtifactRequest, LocalArtifactResult,
    LocalMetadataRegistration, LocalMetadataRequest, LocalMetadataResult, LocalRepositoryManager,
};
use crate::util::fs::{absolute_path, is_regular_file};

/// Repository key for locally installed metadata.
const LOCAL_KEY: &str = "local";

/// Local repository rooted at a directory.
#[derive(Debug)]
pub struct SimpleLocalRepositoryManager {
    base_dir: PathBuf,
    registered: DashSet<String>,
}

impl SimpleLocalRepositoryManager {
    /// Create a manager for `base_dir`. The directory need not exist yet.
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        SimpleLocalRepositoryManager {
            base_dir: absolute_path(base_dir.as_ref()),
            registered: DashSet::new(),
        }
    }

    /// Whether an artifact was registered through `add_artifact`.
    pub fn is_registered(&self, coord: &Coordinate) -> bool {
        self.registered.contains(&coord.full_id())
    }

    fn artifact_path(coord: &Coordinate) -> PathBuf {
        let mut file_name = format!("{}-{}", coord.artifact_id, coord.version());
        if !coord.classifier().is_empty() {
            file_name.push('-');
            file_name.push_str(coord.classifier());
        }
        file_name.push('.');
        file_name.push_str(&coord.extension);

        group_path(&coord.group_id)
            .join(&coord.artifact_id)
            .join(coord.version())
            .join(file_name)
    }

    fn metadata_path(metadata: &Metadata, key: &str) -> PathBuf {
        let mut path = group_path(&metadata.group_id);
        if !metadata.artifact_id.is_empty() {
            path.push(&metadata.artifact_id);
            if !metadata.version.is_empty() {
                path.push(&metadata.version);
            }
        }
        path.join(keyed_file_name(&metadata.metadata_type, key))
    }
}

impl LocalRepositoryManager for SimpleLocalRepositoryManager {
    fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn path_for_local_artifact(&self, coord: &Coordinate) -> PathBuf {
        Self::artifact_path(coord)
    }

    fn path_for_remote_artifact(
        &self,
        coord: &Coordinate,
        _repository: &RemoteRepository,
        _context: &str,
    ) -> PathBuf {
        Self::artifact_path(coord)
    }

    fn path_for_local_metadata(&self, metadata: &Metadata) -> PathBuf {
        Self::metadata_path(metadata, LOCAL_KEY)
    }

    fn path_for_remote_metadata(
        &self,
        metadata: &Metadata,
        repository: &RemoteRepository,
        _context: &str,
    ) -> PathBuf {
        Self::metadata_path(metadata, &repository.id)
    }

    fn find_artifact(&self, request: &LocalArtifactRequest) -> LocalArtifactResult {
        let file = self.base_dir.join(self.path_for_local_artifact(&request.coordinate));
        if is_regular_file(&file) {
            LocalArtifactResult {
                file: Some(file),
                available: true,
            }
        } else {
            LocalArtifactResult::missing()
        }
    }

    fn add_artifact(&self, registration: &LocalArtifactRegistration) {
        let id = registration.coordinate.full_id();
        tracing::debug!(
            "Registered {} in {}{}",
            id,
            self.base_dir.display(),
            registration
                .repository
                .as_ref()
                .map(|r| format!(" (from {})", r.id))
                .unwrap_or_default()
        );
        self.registered.insert(id);
    }

    fn find_metadata(&self, request: &LocalMetadataRequest) -> LocalMetadataResult {
        let path = match &request.repository {
            Some(repository) => {
                self.path_for_remote_metadata(&request.metadata, repository, &request.context)
            }
            None => self.path_for_local_metadata(&request.metadata),
        };
        let file = self.base_dir.join(path);
        LocalMetadataResult {
            file: is_regular_file(&file).then_some(file),
        }
    }

    fn add_metadata(&self, registration: &LocalMetadataRegistration) {
        tracing::debug!(
            "Registered metadata {}:{}:{} in {}",
            registration.metadata.group_id,
            registration.metadata.artifact_id,
            registration.metadata.version,
            self.base_dir.display()
        );
    }
}

fn group_path(group_id: &str) -> PathBuf {
    group_id.split('.').filter(|s| !s.is_empty()).collect()
}

/// `maven-metadata.xml` + `central` -> `maven-metadata-central.xml`
fn keyed_file_name(name: &str, key: &str) -> String {
    match name.rfind('.') {
        Some(dot) => format!("{}-{}{}", &name[..dot], key, &name[dot..]),
        None => format!("{}-{}", name, key),
    }
}
