//! Root discovery.
//!
//! Finds the top of a module tree from any starting module or descriptor
//! without a full model build. Ancestors are read with a minimal parse
//! (no plugins, relaxed validation) and cached in the session's
//! `ResolutionContext`, which also memoises the located root for the
//! duration of one build session.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::SystemTime;

use crate::core::Module;
use crate::model::{
    load_reactor, ModelParser, ParseOptions, ParsedModel, ReactorModelCache, ValidationLevel,
    DESCRIPTOR_FILE,
};
use crate::util::config::{Properties, MARKER_DIR};
use crate::util::fs::same_location;

/// What the host knows about the running build.
#[derive(Debug, Clone)]
pub struct BuildSession {
    /// Descriptor the build was started from.
    pub pom: PathBuf,
    /// Declared top-level directory of the module tree, if any.
    pub root_dir: Option<PathBuf>,
    pub user_properties: Properties,
    pub active_profiles: Vec<String>,
    /// When the build started; `None` if unknown.
    pub build_start_time: Option<SystemTime>,
}

impl BuildSession {
    /// Create a session started from `pom`.
    pub fn new(pom: impl Into<PathBuf>) -> Self {
        BuildSession {
            pom: pom.into(),
            root_dir: None,
            user_properties: Properties::new(),
            active_profiles: Vec::new(),
            build_start_time: None,
        }
    }

    pub fn with_root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(root_dir.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.user_properties.insert(key.into(), value.into());
        self
    }

    pub fn with_profile(mut self, id: impl Into<String>) -> Self {
        self.active_profiles.push(id.into());
        self
    }

    pub fn started_at(mut self, time: SystemTime) -> Self {
        self.build_start_time = Some(time);
        self
    }

    /// Options for parsing the build's own descriptors.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            validation: ValidationLevel::Minimal,
            process_plugins: true,
            active_profiles: self.active_profiles.clone(),
            properties: self.user_properties.clone(),
        }
    }
}

/// Per-session resolution state: the model cache and the located root.
#[derive(Debug, Default)]
pub struct ResolutionContext {
    cache: ReactorModelCache<ParsedModel>,
    root: OnceLock<Option<Arc<Module>>>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &ReactorModelCache<ParsedModel> {
        &self.cache
    }

    /// The memoised root, if it has been located.
    pub fn root(&self) -> Option<Arc<Module>> {
        self.root.get().cloned().flatten()
    }
}

/// Locates the root module of a tree.
pub struct RootLocator<'a> {
    parser: &'a dyn ModelParser,
}

impl<'a> RootLocator<'a> {
    pub fn new(parser: &'a dyn ModelParser) -> Self {
        RootLocator { parser }
    }

    /// Find the root module in `start`'s parent chain.
    ///
    /// First match wins: the module whose directory is `declared_root`,
    /// the first module whose directory holds the marker directory, the
    /// first execution root, and finally `start` itself. Returns `None`
    /// when the chosen module has no descriptor on disk.
    pub fn locate_root(start: &Arc<Module>, declared_root: Option<&Path>) -> Option<Arc<Module>> {
        let lineage = start.lineage();

        let by_declared = declared_root.and_then(|root| {
            lineage
                .iter()
                .find(|m| same_location(m.base_dir(), root))
                .map(|m| (Arc::clone(m), "declared root directory"))
        });

        let (root, strategy) = by_declared
            .or_else(|| {
                lineage
                    .iter()
                    .find(|m| m.base_dir().join(MARKER_DIR).is_dir())
                    .map(|m| (Arc::clone(m), "marker directory"))
            })
            .or_else(|| {
                lineage
                    .iter()
                    .find(|m| m.is_execution_root())
                    .map(|m| (Arc::clone(m), "execution root"))
            })
            .unwrap_or_else(|| (Arc::clone(start), "start module"));

        if !root.descriptor().is_file() {
            tracing::debug!(
                "Root candidate {} has no descriptor at {}",
                root.id(),
                root.descriptor().display()
            );
            return None;
        }

        tracing::debug!("Located root {} by {}", root.id(), strategy);
        Some(root)
    }

    /// Find the root descriptor above `start_descriptor`.
    pub fn find_root_descriptor(
        &self,
        start_descriptor: &Path,
        declared_root: Option<&Path>,
        options: &ParseOptions,
        cache: &ReactorModelCache<ParsedModel>,
    ) -> Option<PathBuf> {
        let ancestors = match self
            .parser
            .ancestry(start_descriptor, &options.for_ancestors(), cache)
        {
            Ok(chain) => chain,
            Err(e) => {
                tracing::warn!(
                    "Failed to read ancestors of {}: {:#}",
                    start_descriptor.display(),
                    e
                );
                Vec::new()
            }
        };

        let found = declared_root
            .and_then(|root| ancestors.iter().find(|m| same_location(m.base_dir(), root)))
            .or_else(|| {
                ancestors
                    .iter()
                    .find(|m| m.base_dir().join(MARKER_DIR).is_dir())
            })
            .map(|m| m.descriptor.clone());
        if found.is_some() {
            return found;
        }

        let root = declared_root?;
        let descriptor = root.join(DESCRIPTOR_FILE);
        if descriptor.is_file() && root.join(MARKER_DIR).is_dir() {
            Some(descriptor)
        } else {
            None
        }
    }

    /// The root module for `session`, located once per context.
    ///
    /// Parses the start descriptor's ancestry, loads the reactor below the
    /// root descriptor and locates the root from the start module.
    pub fn root_module(&self, ctx: &ResolutionContext, session: &BuildSession) -> Option<Arc<Module>> {
        ctx.root
            .get_or_init(|| self.load_root(ctx, session))
            .clone()
    }

    fn load_root(&self, ctx: &ResolutionContext, session: &BuildSession) -> Option<Arc<Module>> {
        if !session.pom.is_file() {
            tracing::debug!("No descriptor at {}", session.pom.display());
            return None;
        }

        let options = session.parse_options();
        let root_descriptor = match self.find_root_descriptor(
            &session.pom,
            session.root_dir.as_deref(),
            &options,
            ctx.cache(),
        ) {
            Some(path) => path,
            None => {
                tracing::info!("[IMH] no root project found above {}", session.pom.display());
                return None;
            }
        };

        let reactor = match load_reactor(
            self.parser,
            &root_descriptor,
            &options,
            ctx.cache(),
            Some(&session.pom),
        ) {
            Ok(reactor) => reactor,
            Err(e) => {
                tracing::warn!(
                    "[IMH] failed to load modules under {}: {:#}",
                    root_descriptor.display(),
                    e
                );
                return None;
            }
        };

        let start = std::iter::once(Arc::clone(&reactor))
            .chain(reactor.descendants())
            .find(|m| same_location(m.descriptor(), &session.pom));

        let root = match start {
            Some(start) => Self::locate_root(&start, session.root_dir.as_deref()),
            None => Some(reactor),
        };
        if let Some(root) = &root {
            tracing::info!("[IMH] root project: {}", root.id());
        }
        root
    }
}
