//! OverlayRepositoryRouter - one logical repository over two directories.
//!
//! Requests for workspace-owned coordinates (their `g:a:v` is registered)
//! go to the overlay manager, everything else to the shared one. Paths
//! coming back from the overlay are rewritten relative to the shared base
//! directory, so callers only ever see paths in the shared addressing
//! scheme.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::{Coordinate, Metadata, ProjectRegistry, RemoteRepository};
use crate::repository::{
    LocalArtifactRegistration, LocalArtifactRequest, LocalArtifactResult,
    LocalMetadataRegistration, LocalMetadataRequest, LocalMetadataResult, LocalRepositoryManager,
};
use crate::util::fs::{absolute_path, is_regular_file, normalize_path, relative_path};

/// Routes local repository operations between a shared and an overlay manager.
pub struct OverlayRepositoryRouter {
    shared: Arc<dyn LocalRepositoryManager>,
    overlay: Arc<dyn LocalRepositoryManager>,
    shared_base: PathBuf,
    overlay_base: PathBuf,
    registry: Arc<ProjectRegistry>,
}

impl OverlayRepositoryRouter {
    pub fn new(
        shared: Arc<dyn LocalRepositoryManager>,
        overlay: Arc<dyn LocalRepositoryManager>,
        registry: Arc<ProjectRegistry>,
    ) -> Self {
        let shared_base = absolute_path(shared.base_dir());
        let overlay_base = absolute_path(overlay.base_dir());
        tracing::debug!(
            "Overlay repository {} over {}",
            overlay_base.display(),
            shared_base.display()
        );
        OverlayRepositoryRouter {
            shared,
            overlay,
            shared_base,
            overlay_base,
            registry,
        }
    }

    pub fn shared(&self) -> &Arc<dyn LocalRepositoryManager> {
        &self.shared
    }

    pub fn overlay(&self) -> &Arc<dyn LocalRepositoryManager> {
        &self.overlay
    }

    pub fn overlay_dir(&self) -> &Path {
        &self.overlay_base
    }

    /// Re-express an overlay-relative path relative to the shared base.
    pub fn relativize(&self, overlay_relative: &Path) -> PathBuf {
        relative_path(&self.shared_base, &self.overlay_base.join(overlay_relative))
    }

    /// The local file of `coord`, if it exists in the repository it routes to.
    ///
    /// Workspace files are looked up under the overlay directory itself, so
    /// the shared base need not exist.
    pub fn local_artifact_file(&self, coord: &Coordinate) -> Option<PathBuf> {
        let file = if self.registry.is_workspace_artifact(coord) {
            self.overlay_base.join(self.overlay.path_for_local_artifact(coord))
        } else {
            self.shared_base.join(self.shared.path_for_local_artifact(coord))
        };
        is_regular_file(&file).then(|| normalize_path(&file))
    }

    fn manager_for(&self, workspace_owned: bool) -> &Arc<dyn LocalRepositoryManager> {
        if workspace_owned {
            &self.overlay
        } else {
            &self.shared
        }
    }
}

impl LocalRepositoryManager for OverlayRepositoryRouter {
    fn base_dir(&self) -> &Path {
        &self.shared_base
    }

    fn path_for_local_artifact(&self, coord: &Coordinate) -> PathBuf {
        if self.registry.is_workspace_artifact(coord) {
            self.relativize(&self.overlay.path_for_local_artifact(coord))
        } else {
            self.shared.path_for_local_artifact(coord)
        }
    }

    fn path_for_remote_artifact(
        &self,
        coord: &Coordinate,
        repository: &RemoteRepository,
        context: &str,
    ) -> PathBuf {
        if self.registry.is_workspace_artifact(coord) {
            self.relativize(&self.overlay.path_for_remote_artifact(coord, repository, context))
        } else {
            self.shared.path_for_remote_artifact(coord, repository, context)
        }
    }

    fn path_for_local_metadata(&self, metadata: &Metadata) -> PathBuf {
        if self.registry.is_workspace_metadata(metadata) {
            self.relativize(&self.overlay.path_for_local_metadata(metadata))
        } else {
            self.shared.path_for_local_metadata(metadata)
        }
    }

    fn path_for_remote_metadata(
        &self,
        metadata: &Metadata,
        repository: &RemoteRepository,
        context: &str,
    ) -> PathBuf {
        if self.registry.is_workspace_metadata(metadata) {
            self.relativize(
                &self
                    .overlay
                    .path_for_remote_metadata(metadata, repository, context),
            )
        } else {
            self.shared
                .path_for_remote_metadata(metadata, repository, context)
        }
    }

    fn find_artifact(&self, request: &LocalArtifactRequest) -> LocalArtifactResult {
        self.manager_for(self.registry.is_workspace_artifact(&request.coordinate))
            .find_artifact(request)
    }

    fn add_artifact(&self, registration: &LocalArtifactRegistration) {
        self.manager_for(self.registry.is_workspace_artifact(&registration.coordinate))
            .add_artifact(registration)
    }

    fn find_metadata(&self, request: &LocalMetadataRequest) -> LocalMetadataResult {
        self.manager_for(self.registry.is_workspace_metadata(&request.metadata))
            .find_metadata(request)
    }

    fn add_metadata(&self, registration: &LocalMetadataRegistration) {
        self.manager_for(self.registry.is_workspace_metadata(&registration.metadata))
            .add_metadata(registration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Module;
    use crate::repository::SimpleLocalRepositoryManager;
    use crate::util::fs::normalize_lexically;
    use rayon::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        tmp: TempDir,
        shared: Arc<SimpleLocalRepositoryManager>,
        overlay: Arc<SimpleLocalRepositoryManager>,
        router: OverlayRepositoryRouter,
    }

    fn fixture() -> Fixture {
        let tmp = TempDir::new().unwrap();
        let shared = Arc::new(SimpleLocalRepositoryManager::new(tmp.path().join("home/.m2/repository")));
        let overlay = Arc::new(SimpleLocalRepositoryManager::new(
            tmp.path().join("work/target/local-repo"),
        ));
        let registry = Arc::new(ProjectRegistry::new());
        registry.register(Module::builder("org.example", "core", "1.0", tmp.path().join("work/core")).build());

        let router = OverlayRepositoryRouter::new(shared.clone(), overlay.clone(), registry);
        Fixture {
            tmp,
            shared,
            overlay,
            router,
        }
    }

    fn workspace_coord() -> Coordinate {
        Coordinate::new("org.example", "core", "1.0")
    }

    fn external_coord() -> Coordinate {
        Coordinate::new("org.lib", "lib", "2.0")
    }

    #[test]
    fn test_routing_of_paths() {
        let f = fixture();

        assert_eq!(
            f.router.path_for_local_artifact(&workspace_coord()),
            PathBuf::from("../../../work/target/local-repo/org/example/core/1.0/core-1.0.jar")
        );
        assert_eq!(
            f.router.path_for_local_artifact(&external_coord()),
            PathBuf::from("org/lib/lib/2.0/lib-2.0.jar")
        );

        let md = Metadata::new("org.example", "core", "1.0");
        assert_eq!(
            f.router.path_for_local_metadata(&md),
            PathBuf::from("../../../work/target/local-repo/org/example/core/1.0/maven-metadata-local.xml")
        );
        // version listings are never workspace-owned
        let listing = Metadata::new("org.example", "core", "");
        assert_eq!(
            f.router.path_for_local_metadata(&listing),
            PathBuf::from("org/example/core/maven-metadata-local.xml")
        );
        assert_eq!(f.router.base_dir(), f.shared.base_dir());
    }

    #[test]
    fn test_paths_round_trip() {
        let f = fixture();
        let central = RemoteRepository::new("central", "https://repo.maven.apache.org/maven2");
        let base = f.router.base_dir().to_path_buf();

        let paths = vec![
            f.router.path_for_local_artifact(&workspace_coord()),
            f.router.path_for_remote_artifact(&workspace_coord(), &central, ""),
            f.router
                .path_for_local_metadata(&Metadata::new("org.example", "core", "1.0")),
            f.router.path_for_remote_metadata(
                &Metadata::new("org.example", "core", "1.0"),
                &central,
                "",
            ),
        ];
        for path in paths {
            assert_eq!(relative_path(&base, &base.join(&path)), path);
            // the file still lands in the overlay directory
            assert!(normalize_lexically(&base.join(&path)).starts_with(f.overlay.base_dir()));
        }
    }

    #[test]
    fn test_find_and_add_are_routed() {
        let f = fixture();

        f.router
            .add_artifact(&LocalArtifactRegistration::installed(workspace_coord()));
        f.router
            .add_artifact(&LocalArtifactRegistration::installed(external_coord()));
        assert!(f.overlay.is_registered(&workspace_coord()));
        assert!(!f.shared.is_registered(&workspace_coord()));
        assert!(f.shared.is_registered(&external_coord()));

        let jar = f
            .tmp
            .path()
            .join("work/target/local-repo/org/example/core/1.0/core-1.0.jar");
        fs::create_dir_all(jar.parent().unwrap()).unwrap();
        fs::write(&jar, "jar").unwrap();

        let found = f
            .router
            .find_artifact(&LocalArtifactRequest::new(workspace_coord()));
        assert_eq!(found.file, Some(jar.clone()));
        assert!(!f
            .router
            .find_artifact(&LocalArtifactRequest::new(external_coord()))
            .available);

        // the shared repository does not exist yet
        assert!(!f.shared.base_dir().exists());
        assert_eq!(
            f.router.local_artifact_file(&workspace_coord()),
            Some(normalize_path(&jar))
        );
        assert_eq!(f.router.local_artifact_file(&external_coord()), None);
    }

    #[test]
    fn test_concurrent_registration() {
        let f = fixture();
        (0..64).into_par_iter().for_each(|i| {
            let coord = if i % 2 == 0 {
                workspace_coord()
            } else {
                Coordinate::new("org.lib", "lib", i.to_string())
            };
            f.router.add_artifact(&LocalArtifactRegistration::installed(coord));
        });
        assert!(f.overlay.is_registered(&workspace_coord()));
        assert!(f.shared.is_registered(&Coordinate::new("org.lib", "lib", "63")));
    }
}
