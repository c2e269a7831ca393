//! Modules - buildable units of the workspace.
//!
//! A `Module` is produced by the host's model builder (or by
//! `model::load_reactor`) and is immutable once built. Parent links are
//! weak; a module owns its collected child modules.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use serde::{Deserialize, Serialize};

use crate::core::coordinate::{project_key, ArtifactTypes, Coordinate};

/// An artifact produced by a module, with its file once packaged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub coordinate: Coordinate,
    pub file: Option<PathBuf>,
}

impl Artifact {
    /// Create an artifact without a file.
    pub fn new(coordinate: Coordinate) -> Self {
        Artifact {
            coordinate,
            file: None,
        }
    }

    /// Attach the packaged file.
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// Output locations of a module's build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildLayout {
    /// Build output directory (`target`).
    pub directory: PathBuf,
    /// Compiled main classes (`target/classes`).
    pub output_directory: PathBuf,
    /// Compiled test classes (`target/test-classes`).
    pub test_output_directory: PathBuf,
    /// Base name of packaged files (`${artifactId}-${version}`).
    pub final_name: String,
}

impl BuildLayout {
    /// The conventional layout under `base_dir`.
    pub fn conventional(base_dir: &Path, artifact_id: &str, version: &str) -> Self {
        let directory = base_dir.join("target");
        BuildLayout {
            output_directory: directory.join("classes"),
            test_output_directory: directory.join("test-classes"),
            directory,
            final_name: format!("{}-{}", artifact_id, version),
        }
    }
}

/// A remote repository declared by a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteRepository {
    pub id: String,
    pub url: String,
}

impl RemoteRepository {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        RemoteRepository {
            id: id.into(),
            url: url.into(),
        }
    }
}

/// One buildable unit in the workspace.
#[derive(Debug)]
pub struct Module {
    group_id: String,
    artifact_id: String,
    version: String,
    packaging: String,
    base_dir: PathBuf,
    descriptor: PathBuf,
    artifact: Artifact,
    attached: Vec<Artifact>,
    build: BuildLayout,
    properties: BTreeMap<String, String>,
    managed_dependencies: BTreeMap<String, Coordinate>,
    repositories: Vec<RemoteRepository>,
    parent: Option<Weak<Module>>,
    collected: Vec<Arc<Module>>,
    execution_root: bool,
}

impl Module {
    /// Start building a module rooted at `base_dir`.
    pub fn builder(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
        base_dir: impl Into<PathBuf>,
    ) -> ModuleBuilder {
        ModuleBuilder::new(group_id.into(), artifact_id.into(), version.into(), base_dir.into())
    }

    /// Registry identity: `g:a:v`.
    pub fn id(&self) -> String {
        project_key(&self.group_id, &self.artifact_id, &self.version)
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn packaging(&self) -> &str {
        &self.packaging
    }

    /// Directory holding the module descriptor.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The module descriptor file (`pom.xml`).
    pub fn descriptor(&self) -> &Path {
        &self.descriptor
    }

    /// The primary artifact.
    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    /// Attached artifacts (sources, test-jar, ...).
    pub fn attached_artifacts(&self) -> &[Artifact] {
        &self.attached
    }

    /// Primary artifact followed by attached artifacts.
    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        std::iter::once(&self.artifact).chain(self.attached.iter())
    }

    pub fn build(&self) -> &BuildLayout {
        &self.build
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Look up a declared property.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Managed dependencies keyed by versionless id.
    pub fn managed_dependencies(&self) -> &BTreeMap<String, Coordinate> {
        &self.managed_dependencies
    }

    pub fn repositories(&self) -> &[RemoteRepository] {
        &self.repositories
    }

    /// The parent module, if it is still alive.
    pub fn parent(&self) -> Option<Arc<Module>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Directly collected child modules.
    pub fn collected(&self) -> &[Arc<Module>] {
        &self.collected
    }

    /// Every collected module below this one, pre-order.
    pub fn descendants(&self) -> Vec<Arc<Module>> {
        let mut out = Vec::new();
        for child in &self.collected {
            out.push(Arc::clone(child));
            out.extend(child.descendants());
        }
        out
    }

    pub fn is_execution_root(&self) -> bool {
        self.execution_root
    }

    /// This module followed by its parent chain.
    pub fn lineage(self: &Arc<Self>) -> Vec<Arc<Module>> {
        let mut chain = vec![Arc::clone(self)];
        let mut current = self.parent();
        while let Some(module) = current {
            current = module.parent();
            chain.push(module);
        }
        chain
    }
}

/// Builder for `Module`.
#[derive(Debug)]
pub struct ModuleBuilder {
    group_id: String,
    artifact_id: String,
    version: String,
    packaging: String,
    base_dir: PathBuf,
    descriptor: Option<PathBuf>,
    artifact_file: Option<PathBuf>,
    attached: Vec<Artifact>,
    build: Option<BuildLayout>,
    properties: BTreeMap<String, String>,
    managed_dependencies: BTreeMap<String, Coordinate>,
    repositories: Vec<RemoteRepository>,
    parent: Option<Weak<Module>>,
    execution_root: bool,
}

impl ModuleBuilder {
    fn new(group_id: String, artifact_id: String, version: String, base_dir: PathBuf) -> Self {
        ModuleBuilder {
            group_id,
            artifact_id,
            version,
            packaging: "jar".to_string(),
            base_dir,
            descriptor: None,
            artifact_file: None,
            attached: Vec::new(),
            build: None,
            properties: BTreeMap::new(),
            managed_dependencies: BTreeMap::new(),
            repositories: Vec::new(),
            parent: None,
            execution_root: false,
        }
    }

    pub fn packaging(mut self, packaging: impl Into<String>) -> Self {
        self.packaging = packaging.into();
        self
    }

    /// Descriptor file; defaults to `<base_dir>/pom.xml`.
    pub fn descriptor(mut self, descriptor: impl Into<PathBuf>) -> Self {
        self.descriptor = Some(descriptor.into());
        self
    }

    /// File of the primary artifact, once packaged.
    pub fn artifact_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.artifact_file = Some(file.into());
        self
    }

    pub fn attach(mut self, artifact: Artifact) -> Self {
        self.attached.push(artifact);
        self
    }

    /// Build layout; defaults to the conventional one.
    pub fn build_layout(mut self, build: BuildLayout) -> Self {
        self.build = Some(build);
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.properties.extend(properties);
        self
    }

    /// Add a managed dependency, keyed by its versionless id.
    pub fn managed_dependency(mut self, coord: Coordinate) -> Self {
        self.managed_dependencies.insert(coord.versionless_id(), coord);
        self
    }

    pub fn repository(mut self, repository: RemoteRepository) -> Self {
        self.repositories.push(repository);
        self
    }

    pub fn parent(mut self, parent: &Arc<Module>) -> Self {
        self.parent = Some(Arc::downgrade(parent));
        self
    }

    pub fn parent_weak(mut self, parent: Weak<Module>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn execution_root(mut self, execution_root: bool) -> Self {
        self.execution_root = execution_root;
        self
    }

    /// Build a module without children.
    pub fn build(self) -> Arc<Module> {
        Arc::new(self.into_module(Vec::new()))
    }

    /// Build a module whose children need a weak link back to it.
    pub fn build_with_children<F>(self, children: F) -> Arc<Module>
    where
        F: FnOnce(&Weak<Module>) -> Vec<Arc<Module>>,
    {
        Arc::new_cyclic(|me| {
            let collected = children(me);
            self.into_module(collected)
        })
    }

    fn into_module(self, collected: Vec<Arc<Module>>) -> Module {
        let build = self.build.unwrap_or_else(|| {
            BuildLayout::conventional(&self.base_dir, &self.artifact_id, &self.version)
        });
        let descriptor = self
            .descriptor
            .unwrap_or_else(|| self.base_dir.join("pom.xml"));

        let coordinate = ArtifactTypes.coordinate(
            &self.group_id,
            &self.artifact_id,
            Some(&self.version),
            &self.packaging,
            None,
        );
        let artifact = Artifact {
            coordinate,
            file: self.artifact_file,
        };

        Module {
            group_id: self.group_id,
            artifact_id: self.artifact_id,
            version: self.version,
            packaging: self.packaging,
            base_dir: self.base_dir,
            descriptor,
            artifact,
            attached: self.attached,
            build,
            properties: self.properties,
            managed_dependencies: self.managed_dependencies,
            repositories: self.repositories,
            parent: self.parent,
            collected,
            execution_root: self.execution_root,
        }
    }
}
