//! Session start-up.
//!
//! Resolves the configuration, locates the root module and wires the
//! workspace resolver and the overlay repository for one build. Every
//! failure here is logged and leaves the affected feature off.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::core::{ConfigNode, Coordinate, Module, ProjectRegistry};
use crate::model::ModelParser;
use crate::ops::root::{BuildSession, ResolutionContext, RootLocator};
use crate::placeholder::{DependencyGraphResolver, PlaceholderEngine, PlaceholderError};
use crate::repository::{LocalRepositoryManager, OverlayRepositoryRouter, ProjectAwareRepository};
use crate::util::config::{project_config_path, ImhConfig};
use crate::util::fs::absolute_path;
use crate::workspace::{ChainedWorkspaceReader, WorkspaceReader, WorkspaceResolver};

/// Creates the local repository manager of the overlay directory.
pub type OverlayFactory<'a> = dyn Fn(&Path) -> Result<Arc<dyn LocalRepositoryManager>> + 'a;

/// Everything the extension set up for one build.
pub struct Reactor {
    config: ImhConfig,
    registry: Arc<ProjectRegistry>,
    root: Option<Arc<Module>>,
    shared: Arc<dyn LocalRepositoryManager>,
    workspace: Option<Arc<WorkspaceResolver>>,
    router: Option<Arc<OverlayRepositoryRouter>>,
}

/// Set up the extension for `session`.
///
/// `shared` is the host's local repository; `overlay_factory` creates the
/// manager for the overlay directory when the overlay is enabled.
pub fn start_session(
    session: &BuildSession,
    parser: &dyn ModelParser,
    shared: Arc<dyn LocalRepositoryManager>,
    overlay_factory: &OverlayFactory<'_>,
) -> Reactor {
    let config_dir = session
        .root_dir
        .clone()
        .or_else(|| session.pom.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    let file_config = ImhConfig::load_or_default(&project_config_path(&config_dir));

    let mut reactor = Reactor {
        config: ImhConfig::resolve(&session.user_properties, None, file_config.clone()),
        registry: Arc::new(ProjectRegistry::new()),
        root: None,
        shared,
        workspace: None,
        router: None,
    };

    if !reactor.config.workspace {
        tracing::info!("[IMH] workspace extension disabled");
    }
    if !reactor.config.repository {
        tracing::info!("[IMH] repository extension disabled");
    }
    if !reactor.config.workspace && !reactor.config.repository {
        return reactor;
    }

    if !session.pom.is_file() {
        tracing::info!("[IMH] pom file not found: {}", session.pom.display());
        return reactor;
    }

    let ctx = ResolutionContext::new();
    let Some(root) = RootLocator::new(parser).root_module(&ctx, session) else {
        tracing::warn!("[IMH] no root project, workspace and overlay repository stay off");
        return reactor;
    };

    reactor.config = ImhConfig::resolve(&session.user_properties, Some(root.properties()), file_config);
    reactor.registry.register_all_descendants(&root);
    tracing::debug!("[IMH] registered {} workspace modules", reactor.registry.len());

    if reactor.config.workspace {
        tracing::debug!("[IMH] setting up workspace");
        reactor.workspace = Some(Arc::new(WorkspaceResolver::new(
            Arc::clone(&reactor.registry),
            session.build_start_time,
            reactor.config.clone(),
        )));
    }

    if reactor.config.repository {
        tracing::info!("[IMH] setting up overlay repository");
        match reactor.setup_router(&root, overlay_factory) {
            Ok(router) => reactor.router = Some(Arc::new(router)),
            Err(e) => tracing::error!("[IMH] failed to setup repository: {:#}", e),
        }
    }

    reactor.root = Some(root);
    reactor
}

impl Reactor {
    fn setup_router(&self, root: &Module, overlay_factory: &OverlayFactory<'_>) -> Result<OverlayRepositoryRouter> {
        let overlay_dir = self.config.overlay_dir_for(root);
        let overlay_dir = if overlay_dir.is_relative() {
            absolute_path(&root.base_dir().join(overlay_dir))
        } else {
            overlay_dir
        };

        let overlay = overlay_factory(&overlay_dir)?;
        Ok(OverlayRepositoryRouter::new(
            Arc::clone(&self.shared),
            overlay,
            Arc::clone(&self.registry),
        ))
    }

    pub fn config(&self) -> &ImhConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ProjectRegistry> {
        &self.registry
    }

    /// The root module, when one was located and a feature needed it.
    pub fn root(&self) -> Option<&Arc<Module>> {
        self.root.as_ref()
    }

    pub fn workspace(&self) -> Option<&Arc<WorkspaceResolver>> {
        self.workspace.as_ref()
    }

    pub fn router(&self) -> Option<&Arc<OverlayRepositoryRouter>> {
        self.router.as_ref()
    }

    /// The workspace artifact for `coord`; `None` when the workspace is off.
    pub fn find_artifact(&self, coord: &Coordinate) -> Option<PathBuf> {
        self.workspace.as_ref()?.find_artifact(coord)
    }

    pub fn find_versions(&self, coord: &Coordinate) -> Vec<String> {
        self.workspace
            .as_ref()
            .map(|w| w.find_versions(coord))
            .unwrap_or_default()
    }

    /// The local repository the host should use: the router when the
    /// overlay is set up, the shared repository otherwise.
    pub fn local_repository(&self) -> Arc<dyn LocalRepositoryManager> {
        match &self.router {
            Some(router) => Arc::clone(router) as Arc<dyn LocalRepositoryManager>,
            None => Arc::clone(&self.shared),
        }
    }

    /// Our workspace reader in front of the host's own, if any.
    pub fn workspace_reader(&self, host: Option<Arc<dyn WorkspaceReader>>) -> ChainedWorkspaceReader {
        let mut chain = ChainedWorkspaceReader::default();
        if let Some(workspace) = &self.workspace {
            chain.push(Arc::clone(workspace) as Arc<dyn WorkspaceReader>);
        }
        if let Some(host) = host {
            chain.push(host);
        }
        chain
    }

    /// A repository view over the shared repository that prefers
    /// workspace and overlay artifacts.
    pub fn project_aware_repository(&self) -> ProjectAwareRepository {
        let mut repo = ProjectAwareRepository::new(Arc::clone(&self.shared));
        if let Some(workspace) = &self.workspace {
            repo = repo.with_workspace(Arc::clone(workspace) as Arc<dyn WorkspaceReader>);
        }
        if let Some(router) = &self.router {
            repo = repo.with_router(Arc::clone(router));
        }
        repo
    }

    pub fn placeholder_engine<'a>(&'a self, resolver: &'a dyn DependencyGraphResolver) -> PlaceholderEngine<'a> {
        PlaceholderEngine::new(resolver, &self.registry, &self.config)
    }

    /// Substitute placeholders in one configuration tree of `module`.
    pub fn substitute_placeholders(
        &self,
        tree: &ConfigNode,
        module: &Module,
        resolver: &dyn DependencyGraphResolver,
    ) -> Result<ConfigNode, PlaceholderError> {
        self.placeholder_engine(resolver).substitute(tree, module)
    }
}
