//! WorkspaceResolver - artifacts of modules built in this session.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use crate::core::{Coordinate, Module, ProjectRegistry};
use crate::util::config::ImhConfig;
use crate::util::fs::is_regular_file;
use crate::workspace::staleness::is_actual;
use crate::workspace::WorkspaceReader;

/// Resolves coordinates of registered modules to their build outputs.
#[derive(Debug)]
pub struct WorkspaceResolver {
    registry: Arc<ProjectRegistry>,
    build_start: Option<SystemTime>,
    config: ImhConfig,
}

impl WorkspaceResolver {
    /// Create a resolver over `registry`.
    pub fn new(registry: Arc<ProjectRegistry>, build_start: Option<SystemTime>, config: ImhConfig) -> Self {
        WorkspaceResolver {
            registry,
            build_start,
            config,
        }
    }

    pub fn registry(&self) -> &Arc<ProjectRegistry> {
        &self.registry
    }

    /// Locate the file of a workspace artifact.
    ///
    /// Returns `None` when the coordinate is not a workspace module or its
    /// artifact is neither attached, packaged and up to date, nor
    /// replaceable by the compiled-output directory.
    pub fn find_artifact(&self, coord: &Coordinate) -> Option<PathBuf> {
        let module = self.registry.module_for(coord)?;

        if coord.extension == "pom" {
            let descriptor = module.descriptor();
            return is_regular_file(descriptor).then(|| descriptor.to_path_buf());
        }

        if let Some(file) = attached_file(&module, coord) {
            return Some(file);
        }

        let build = module.build();
        let output_dir = if coord.is_test_artifact() {
            &build.test_output_directory
        } else {
            &build.output_directory
        };

        let packaged = build.directory.join(packaged_name(&build.final_name, coord));
        if is_actual(&packaged, output_dir, self.build_start, self.config.staleness) {
            tracing::debug!("Resolved {} from workspace: {}", coord, packaged.display());
            return Some(packaged);
        }

        if self.config.directory_fallback_enabled_for(&module) && output_dir.is_dir() {
            tracing::debug!(
                "Resolved {} to compiled output {}",
                coord,
                output_dir.display()
            );
            return Some(output_dir.clone());
        }

        None
    }

    /// The version the workspace holds for `coord`, if any.
    pub fn find_versions(&self, coord: &Coordinate) -> Vec<String> {
        self.registry
            .module_for(coord)
            .map(|module| vec![module.version().to_string()])
            .unwrap_or_default()
    }
}

impl WorkspaceReader for WorkspaceResolver {
    fn find_artifact(&self, coord: &Coordinate) -> Option<PathBuf> {
        WorkspaceResolver::find_artifact(self, coord)
    }

    fn find_versions(&self, coord: &Coordinate) -> Vec<String> {
        WorkspaceResolver::find_versions(self, coord)
    }
}

/// An attached (or primary) artifact file matching `coord` exactly.
fn attached_file(module: &Module, coord: &Coordinate) -> Option<PathBuf> {
    let requested = coord.artifact_key();
    module
        .artifacts()
        .filter(|a| a.coordinate.artifact_key() == requested)
        .filter(|a| a.coordinate.version() == coord.version())
        .filter_map(|a| a.file.as_ref())
        .find(|file| file.exists())
        .cloned()
}

/// `finalName[-classifier].extension`
fn packaged_name(final_name: &str, coord: &Coordinate) -> String {
    let mut name = final_name.to_string();
    if !coord.classifier().is_empty() {
        name.push('-');
        name.push_str(coord.classifier());
    }
    name.push('.');
    name.push_str(&coord.extension);
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Artifact;
    use filetime::{set_file_mtime, FileTime};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const T: i64 = 1_700_000_000;

    fn touch(path: &Path, secs: i64) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
        set_file_mtime(path, FileTime::from_unix_time(secs, 0)).unwrap();
    }

    fn resolver_with(module: Arc<Module>, config: ImhConfig) -> WorkspaceResolver {
        let registry = Arc::new(ProjectRegistry::new());
        registry.register(module);
        WorkspaceResolver::new(registry, None, config)
    }

    fn module(base: &Path) -> crate::core::ModuleBuilder {
        Module::builder("org.example", "core", "1.0", base)
    }

    #[test]
    fn test_pom_lookup() {
        let tmp = TempDir::new().unwrap();
        let resolver = resolver_with(module(tmp.path()).build(), ImhConfig::default());
        let pom = Coordinate::new("org.example", "core", "1.0").with_extension("pom");

        assert_eq!(resolver.find_artifact(&pom), None);

        fs::write(tmp.path().join("pom.xml"), "<project/>").unwrap();
        assert_eq!(resolver.find_artifact(&pom), Some(tmp.path().join("pom.xml")));
    }

    #[test]
    fn test_attached_artifact_wins_without_staleness_check() {
        let tmp = TempDir::new().unwrap();
        let sources = tmp.path().join("out/core-sources.jar");
        touch(&sources, T - 100);
        touch(&tmp.path().join("target/classes/A.class"), T);

        let attached = Artifact::new(
            Coordinate::new("org.example", "core", "1.0").with_classifier("sources"),
        )
        .with_file(&sources);
        let resolver = resolver_with(module(tmp.path()).attach(attached).build(), ImhConfig::default());

        let coord = Coordinate::new("org.example", "core", "1.0").with_classifier("sources");
        assert_eq!(resolver.find_artifact(&coord), Some(sources));
    }

    #[test]
    fn test_packaged_artifact_and_staleness() {
        let tmp = TempDir::new().unwrap();
        let jar = tmp.path().join("target/core-1.0.jar");
        let class = tmp.path().join("target/classes/A.class");
        touch(&jar, T);
        touch(&class, T - 1);

        let resolver = resolver_with(module(tmp.path()).build(), ImhConfig::default());
        let coord = Coordinate::new("org.example", "core", "1.0");
        assert_eq!(resolver.find_artifact(&coord), Some(jar.clone()));

        set_file_mtime(&class, FileTime::from_unix_time(T + 1, 0)).unwrap();
        assert_eq!(resolver.find_artifact(&coord), None);

        assert_eq!(resolver.find_versions(&coord), vec!["1.0".to_string()]);
        assert!(resolver
            .find_versions(&Coordinate::new("org.example", "other", "1.0"))
            .is_empty());
    }

    #[test]
    fn test_test_jar_uses_test_output() {
        let tmp = TempDir::new().unwrap();
        let jar = tmp.path().join("target/core-1.0-tests.jar");
        touch(&jar, T);
        // newer main classes do not make the test jar stale
        touch(&tmp.path().join("target/classes/A.class"), T + 5);
        touch(&tmp.path().join("target/test-classes/ATest.class"), T - 5);
        set_file_mtime(tmp.path().join("target/test-classes"), FileTime::from_unix_time(T - 5, 0)).unwrap();

        let resolver = resolver_with(module(tmp.path()).build(), ImhConfig::default());
        let coord = Coordinate::new("org.example", "core", "1.0").with_classifier("tests");
        assert_eq!(resolver.find_artifact(&coord), Some(jar));
    }

    #[test]
    fn test_directory_fallback() {
        let tmp = TempDir::new().unwrap();
        let classes = tmp.path().join("target/classes");
        touch(&classes.join("A.class"), T);
        let coord = Coordinate::new("org.example", "core", "1.0");

        let resolver = resolver_with(module(tmp.path()).build(), ImhConfig::default());
        assert_eq!(resolver.find_artifact(&coord), None);

        let config = ImhConfig {
            directory_fallback: true,
            ..ImhConfig::default()
        };
        let resolver = resolver_with(module(tmp.path()).build(), config);
        assert_eq!(resolver.find_artifact(&coord), Some(classes.clone()));

        // per-module switch
        let resolver = resolver_with(
            module(tmp.path())
                .property("imh.workspace.directories", "true")
                .build(),
            ImhConfig::default(),
        );
        assert_eq!(resolver.find_artifact(&coord), Some(classes));
    }

    #[test]
    fn test_unknown_coordinate() {
        let tmp = TempDir::new().unwrap();
        let resolver = resolver_with(module(tmp.path()).build(), ImhConfig::default());
        assert_eq!(
            resolver.find_artifact(&Coordinate::new("org.example", "core", "2.0")),
            None
        );
    }

    #[test]
    fn test_packaged_name() {
        let coord = Coordinate::new("g", "a", "1").with_extension("war");
        assert_eq!(packaged_name("a-1", &coord), "a-1.war");
        let coord = Coordinate::new("g", "a", "1").with_classifier("tests");
        assert_eq!(packaged_name("a-1", &coord), "a-1-tests.jar");
    }
}
