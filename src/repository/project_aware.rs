//! Repository view that prefers workspace and overlay artifacts.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::Coordinate;
use crate::repository::{LocalRepositoryManager, OverlayRepositoryRouter};
use crate::util::fs::{is_regular_file, relative_path};
use crate::workspace::WorkspaceReader;

/// A local repository consulted through the workspace first.
pub struct ProjectAwareRepository {
    delegate: Arc<dyn LocalRepositoryManager>,
    workspace: Option<Arc<dyn WorkspaceReader>>,
    router: Option<Arc<OverlayRepositoryRouter>>,
}

impl ProjectAwareRepository {
    pub fn new(delegate: Arc<dyn LocalRepositoryManager>) -> Self {
        ProjectAwareRepository {
            delegate,
            workspace: None,
            router: None,
        }
    }

    pub fn with_workspace(mut self, workspace: Arc<dyn WorkspaceReader>) -> Self {
        self.workspace = Some(workspace);
        self
    }

    pub fn with_router(mut self, router: Arc<OverlayRepositoryRouter>) -> Self {
        self.router = Some(router);
        self
    }

    pub fn base_dir(&self) -> &Path {
        self.delegate.base_dir()
    }

    /// Path of `coord` relative to the base directory.
    pub fn path_of(&self, coord: &Coordinate) -> PathBuf {
        match self.project_file(coord) {
            Some(file) => relative_path(self.base_dir(), &file),
            None => self.delegate.path_for_local_artifact(coord),
        }
    }

    /// The artifact file from the workspace, the overlay or the base directory.
    pub fn find(&self, coord: &Coordinate) -> Option<PathBuf> {
        self.project_file(coord).or_else(|| {
            let file = self.base_dir().join(self.delegate.path_for_local_artifact(coord));
            is_regular_file(&file).then_some(file)
        })
    }

    fn project_file(&self, coord: &Coordinate) -> Option<PathBuf> {
        let from_workspace = self
            .workspace
            .as_ref()
            .and_then(|w| w.find_artifact(coord))
            .filter(|f| is_regular_file(f));
        from_workspace.or_else(|| {
            self.router
                .as_ref()
                .and_then(|r| r.local_artifact_file(coord))
        })
    }
}
