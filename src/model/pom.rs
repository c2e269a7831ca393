//! POM reader.
//!
//! Reads the parts of a `pom.xml` the extension needs: coordinates with
//! parent inheritance, properties (including active profiles), aggregated
//! modules, build layout, dependency management, repositories and, when
//! asked to, build plugins with their configuration trees.
//!
//! Parents are only followed on the local filesystem through
//! `<relativePath>`; nothing is downloaded.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use roxmltree::{Document, Node};

use crate::core::{
    ArtifactTypes, BuildLayout, ConfigNode, Coordinate, Plugin, PluginExecution, RemoteRepository,
};
use crate::model::cache::{ReactorModelCache, RAW_TAG};
use crate::model::{ModelError, ModelParser, ParentRef, ParseOptions, ParsedModel, ValidationLevel};
use crate::util::config::Properties;
use crate::util::fs::normalize_path;

const MAX_PARENT_DEPTH: usize = 64;
const MAX_INTERPOLATION_PASSES: usize = 16;
const DEFAULT_RELATIVE_PATH: &str = "../pom.xml";
const DEFAULT_PLUGIN_GROUP: &str = "org.apache.maven.plugins";

/// `ModelParser` backed by `roxmltree`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PomParser;

impl PomParser {
    pub fn new() -> Self {
        PomParser
    }

    fn parse_at_depth(
        &self,
        descriptor: &Path,
        options: &ParseOptions,
        cache: &ReactorModelCache<ParsedModel>,
        depth: usize,
    ) -> Result<ParsedModel, ModelError> {
        if depth > MAX_PARENT_DEPTH {
            return Err(ModelError::ParentCycle {
                path: descriptor.display().to_string(),
            });
        }

        let raw = read_raw(descriptor, options.process_plugins)?;
        let base_dir = descriptor.parent().unwrap_or_else(|| Path::new("."));
        let parent = match &raw.parent {
            Some(parent_ref) => self.load_parent(parent_ref, base_dir, options, cache, depth + 1)?,
            None => None,
        };

        build_model(raw, descriptor, parent.as_ref(), options)
    }

    /// Load the parent of a descriptor in `child_dir`, if it is local.
    fn load_parent(
        &self,
        parent_ref: &ParentRef,
        child_dir: &Path,
        options: &ParseOptions,
        cache: &ReactorModelCache<ParsedModel>,
        depth: usize,
    ) -> Result<Option<ParsedModel>, ModelError> {
        if let Some(cached) = cache.get(
            &parent_ref.group_id,
            &parent_ref.artifact_id,
            &parent_ref.version,
            RAW_TAG,
        ) {
            return Ok(Some(cached));
        }

        let Some(path) = parent_ref.descriptor_from(child_dir) else {
            return Ok(None);
        };
        if !path.is_file() {
            tracing::debug!(
                "Parent {}:{}:{} not found at {}",
                parent_ref.group_id,
                parent_ref.artifact_id,
                parent_ref.version,
                path.display()
            );
            return Ok(None);
        }

        let path = normalize_path(&path);
        let model = self.parse_at_depth(&path, &options.for_ancestors(), cache, depth)?;
        let matches = model.artifact_id == parent_ref.artifact_id
            && (model.group_id.is_empty() || model.group_id == parent_ref.group_id)
            && (model.version.is_empty() || model.version == parent_ref.version);
        if !matches {
            tracing::debug!(
                "{} is {}, not the referenced parent {}:{}:{}",
                path.display(),
                model.id(),
                parent_ref.group_id,
                parent_ref.artifact_id,
                parent_ref.version
            );
            return Ok(None);
        }

        cache.put(
            &parent_ref.group_id,
            &parent_ref.artifact_id,
            &parent_ref.version,
            RAW_TAG,
            model.clone(),
        );
        Ok(Some(model))
    }
}

impl ModelParser for PomParser {
    fn parse(
        &self,
        descriptor: &Path,
        options: &ParseOptions,
        cache: &ReactorModelCache<ParsedModel>,
    ) -> Result<ParsedModel> {
        Ok(self.parse_at_depth(descriptor, options, cache, 0)?)
    }

    fn ancestry(
        &self,
        descriptor: &Path,
        options: &ParseOptions,
        cache: &ReactorModelCache<ParsedModel>,
    ) -> Result<Vec<ParsedModel>> {
        let mut chain = vec![self.parse_at_depth(descriptor, options, cache, 0)?];

        loop {
            let Some(current) = chain.last() else { break };
            let Some(parent_ref) = current.parent.clone() else { break };
            let child_dir = current.base_dir().to_path_buf();

            if chain.len() > MAX_PARENT_DEPTH {
                return Err(ModelError::ParentCycle {
                    path: descriptor.display().to_string(),
                }
                .into());
            }

            match self.load_parent(&parent_ref, &child_dir, options, cache, chain.len())? {
                Some(parent) => chain.push(parent),
                None => break,
            }
        }

        Ok(chain)
    }
}

#[derive(Debug, Default)]
struct RawPom {
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<String>,
    packaging: Option<String>,
    parent: Option<ParentRef>,
    modules: Vec<String>,
    properties: Properties,
    profiles: Vec<RawProfile>,
    build: RawBuild,
    managed: Vec<RawDependency>,
    repositories: Vec<RemoteRepository>,
    plugins: Vec<Plugin>,
}

#[derive(Debug, Default)]
struct RawProfile {
    id: String,
    active_by_default: bool,
    properties: Properties,
    modules: Vec<String>,
}

#[derive(Debug, Default)]
struct RawBuild {
    directory: Option<String>,
    final_name: Option<String>,
    output_directory: Option<String>,
    test_output_directory: Option<String>,
}

#[derive(Debug, Default)]
struct RawDependency {
    group_id: String,
    artifact_id: String,
    version: Option<String>,
    type_name: Option<String>,
    classifier: Option<String>,
}

fn read_raw(descriptor: &Path, process_plugins: bool) -> Result<RawPom, ModelError> {
    let text = std::fs::read_to_string(descriptor).map_err(|source| ModelError::Io {
        path: descriptor.display().to_string(),
        source,
    })?;
    let doc = Document::parse(&text).map_err(|e| ModelError::Parse {
        path: descriptor.display().to_string(),
        message: e.to_string(),
    })?;

    let project = doc.root_element();
    if project.tag_name().name() != "project" {
        return Err(ModelError::Parse {
            path: descriptor.display().to_string(),
            message: format!("expected <project>, found <{}>", project.tag_name().name()),
        });
    }

    let mut raw = RawPom {
        group_id: child_text(project, "groupId"),
        artifact_id: child_text(project, "artifactId"),
        version: child_text(project, "version"),
        packaging: child_text(project, "packaging"),
        parent: child(project, "parent").map(read_parent),
        modules: list_texts(project, "modules", "module"),
        properties: read_properties(project),
        ..RawPom::default()
    };

    if let Some(profiles) = child(project, "profiles") {
        raw.profiles = elements(profiles, "profile").map(read_profile).collect();
    }

    if let Some(build) = child(project, "build") {
        raw.build = RawBuild {
            directory: child_text(build, "directory"),
            final_name: child_text(build, "finalName"),
            output_directory: child_text(build, "outputDirectory"),
            test_output_directory: child_text(build, "testOutputDirectory"),
        };
        if process_plugins {
            if let Some(plugins) = child(build, "plugins") {
                raw.plugins = elements(plugins, "plugin").map(read_plugin).collect();
            }
        }
    }

    if let Some(deps) = child(project, "dependencyManagement").and_then(|dm| child(dm, "dependencies")) {
        raw.managed = elements(deps, "dependency")
            .filter_map(|dep| {
                Some(RawDependency {
                    group_id: child_text(dep, "groupId")?,
                    artifact_id: child_text(dep, "artifactId")?,
                    version: child_text(dep, "version"),
                    type_name: child_text(dep, "type"),
                    classifier: child_text(dep, "classifier"),
                })
            })
            .collect();
    }

    if let Some(repos) = child(project, "repositories") {
        raw.repositories = elements(repos, "repository")
            .filter_map(|repo| {
                Some(RemoteRepository::new(
                    child_text(repo, "id")?,
                    child_text(repo, "url")?,
                ))
            })
            .collect();
    }

    Ok(raw)
}

fn read_parent(node: Node) -> ParentRef {
    let relative_path = match child(node, "relativePath") {
        Some(rp) => rp.text().map(|t| t.trim().to_string()).unwrap_or_default(),
        None => DEFAULT_RELATIVE_PATH.to_string(),
    };
    ParentRef {
        group_id: child_text(node, "groupId").unwrap_or_default(),
        artifact_id: child_text(node, "artifactId").unwrap_or_default(),
        version: child_text(node, "version").unwrap_or_default(),
        relative_path,
    }
}

fn read_profile(node: Node) -> RawProfile {
    let active_by_default = child(node, "activation")
        .and_then(|a| child_text(a, "activeByDefault"))
        .is_some_and(|v| v == "true");
    RawProfile {
        id: child_text(node, "id").unwrap_or_default(),
        active_by_default,
        properties: read_properties(node),
        modules: list_texts(node, "modules", "module"),
    }
}

fn read_plugin(node: Node) -> Plugin {
    let executions = child(node, "executions")
        .map(|execs| {
            elements(execs, "execution")
                .map(|exec| PluginExecution {
                    id: child_text(exec, "id").unwrap_or_else(|| "default".to_string()),
                    configuration: child(exec, "configuration").map(config_node),
                })
                .collect()
        })
        .unwrap_or_default();

    Plugin {
        group_id: child_text(node, "groupId").unwrap_or_else(|| DEFAULT_PLUGIN_GROUP.to_string()),
        artifact_id: child_text(node, "artifactId").unwrap_or_default(),
        version: child_text(node, "version"),
        configuration: child(node, "configuration").map(config_node),
        executions,
    }
}

fn read_properties(node: Node) -> Properties {
    child(node, "properties")
        .map(|props| {
            props
                .children()
                .filter(|n| n.is_element())
                .map(|p| {
                    let value = p.text().map(|t| t.trim().to_string()).unwrap_or_default();
                    (p.tag_name().name().to_string(), value)
                })
                .collect()
        })
        .unwrap_or_default()
}

fn config_node(node: Node) -> ConfigNode {
    let children: Vec<ConfigNode> = node
        .children()
        .filter(|n| n.is_element())
        .map(config_node)
        .collect();

    let value = if children.is_empty() {
        node.text()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    } else {
        None
    };

    ConfigNode {
        name: node.tag_name().name().to_string(),
        value,
        children,
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn elements<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

fn child_text(node: Node, name: &str) -> Option<String> {
    child(node, name)
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn list_texts(node: Node, list: &str, item: &str) -> Vec<String> {
    child(node, list)
        .map(|l| {
            elements(l, item)
                .filter_map(|i| i.text().map(|t| t.trim().to_string()))
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Apply inheritance, profiles, defaults and interpolation.
fn build_model(
    raw: RawPom,
    descriptor: &Path,
    parent: Option<&ParsedModel>,
    options: &ParseOptions,
) -> Result<ParsedModel, ModelError> {
    let path = descriptor.display().to_string();
    let base_dir = descriptor.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();

    let artifact_id = raw.artifact_id.clone().ok_or_else(|| ModelError::MissingElement {
        path: path.clone(),
        element: "artifactId".to_string(),
    })?;
    let group_id = inherited(&raw.group_id, raw.parent.as_ref().map(|p| &p.group_id));
    let version = inherited(&raw.version, raw.parent.as_ref().map(|p| &p.version));

    let (group_id, version) = match (group_id, version, options.validation) {
        (Some(g), Some(v), _) => (g, v),
        (g, v, ValidationLevel::Minimal) => (g.unwrap_or_default(), v.unwrap_or_default()),
        (None, _, ValidationLevel::Strict) => {
            return Err(ModelError::MissingElement {
                path,
                element: "groupId".to_string(),
            })
        }
        (_, None, ValidationLevel::Strict) => {
            return Err(ModelError::MissingElement {
                path,
                element: "version".to_string(),
            })
        }
    };

    let mut properties = parent.map(|p| p.properties.clone()).unwrap_or_default();
    properties.extend(raw.properties);
    let mut modules = raw.modules;
    for profile in &raw.profiles {
        let active =
            profile.active_by_default || options.active_profiles.iter().any(|id| *id == profile.id);
        if active {
            properties.extend(profile.properties.clone());
            modules.extend(profile.modules.iter().cloned());
        }
    }

    let packaging = raw.packaging.unwrap_or_else(|| "jar".to_string());

    let mut vars = Interpolator::new(&properties, &options.properties);
    vars.set("project.groupId", &group_id);
    vars.set("project.artifactId", &artifact_id);
    vars.set("project.version", &version);
    vars.set("project.packaging", &packaging);
    vars.set("project.basedir", &base_dir.display().to_string());
    vars.set("basedir", &base_dir.display().to_string());
    if let Some(parent_ref) = &raw.parent {
        vars.set("project.parent.groupId", &parent_ref.group_id);
        vars.set("project.parent.artifactId", &parent_ref.artifact_id);
        vars.set("project.parent.version", &parent_ref.version);
    }

    let directory = resolve_path(
        &base_dir,
        &vars.apply(raw.build.directory.as_deref().unwrap_or("${project.basedir}/target")),
    );
    vars.set("project.build.directory", &directory.display().to_string());
    let final_name = vars.apply(
        raw.build
            .final_name
            .as_deref()
            .unwrap_or("${project.artifactId}-${project.version}"),
    );
    vars.set("project.build.finalName", &final_name);
    let output_directory = resolve_path(
        &base_dir,
        &vars.apply(
            raw.build
                .output_directory
                .as_deref()
                .unwrap_or("${project.build.directory}/classes"),
        ),
    );
    let test_output_directory = resolve_path(
        &base_dir,
        &vars.apply(
            raw.build
                .test_output_directory
                .as_deref()
                .unwrap_or("${project.build.directory}/test-classes"),
        ),
    );

    let properties: Properties = properties
        .iter()
        .map(|(k, v)| (k.clone(), vars.apply(v)))
        .collect();

    let mut managed: BTreeMap<String, Coordinate> = BTreeMap::new();
    if let Some(parent) = parent {
        for coord in &parent.managed_dependencies {
            managed.insert(coord.versionless_id(), coord.clone());
        }
    }
    for dep in &raw.managed {
        let version = dep.version.as_deref().map(|v| vars.apply(v));
        let coord = ArtifactTypes.coordinate(
            &vars.apply(&dep.group_id),
            &vars.apply(&dep.artifact_id),
            version.as_deref(),
            dep.type_name.as_deref().unwrap_or("jar"),
            dep.classifier.as_deref(),
        );
        managed.insert(coord.versionless_id(), coord);
    }

    let mut repositories: Vec<RemoteRepository> = parent
        .map(|p| p.repositories.clone())
        .unwrap_or_default();
    for repo in raw.repositories {
        let repo = RemoteRepository::new(vars.apply(&repo.id), vars.apply(&repo.url));
        repositories.retain(|r| r.id != repo.id);
        repositories.push(repo);
    }

    let plugins = raw
        .plugins
        .into_iter()
        .map(|plugin| interpolate_plugin(plugin, &vars))
        .collect();

    Ok(ParsedModel {
        descriptor: descriptor.to_path_buf(),
        group_id,
        artifact_id,
        version,
        packaging,
        parent: raw.parent,
        modules,
        properties,
        build: BuildLayout {
            directory,
            output_directory,
            test_output_directory,
            final_name,
        },
        managed_dependencies: managed.into_values().collect(),
        repositories,
        plugins,
    })
}

fn inherited(own: &Option<String>, parent: Option<&String>) -> Option<String> {
    own.clone()
        .or_else(|| parent.filter(|p| !p.is_empty()).cloned())
}

fn resolve_path(base_dir: &Path, value: &str) -> PathBuf {
    let path = PathBuf::from(value);
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

fn interpolate_plugin(mut plugin: Plugin, vars: &Interpolator) -> Plugin {
    plugin.version = plugin.version.map(|v| vars.apply(&v));
    plugin.configuration = plugin.configuration.map(|c| interpolate_node(c, vars));
    for execution in &mut plugin.executions {
        execution.configuration = execution
            .configuration
            .take()
            .map(|c| interpolate_node(c, vars));
    }
    plugin
}

fn interpolate_node(mut node: ConfigNode, vars: &Interpolator) -> ConfigNode {
    node.value = node.value.map(|v| vars.apply(&v));
    node.children = node
        .children
        .into_iter()
        .map(|c| interpolate_node(c, vars))
        .collect();
    node
}

/// `${...}` expansion. Unknown references are kept verbatim.
struct Interpolator {
    vars: BTreeMap<String, String>,
    user: Properties,
}

impl Interpolator {
    fn new(properties: &Properties, user: &Properties) -> Self {
        Interpolator {
            vars: properties.clone(),
            user: user.clone(),
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        let key = key.strip_prefix("pom.").map_or_else(
            || key.to_string(),
            |rest| format!("project.{}", rest),
        );
        self.user
            .get(&key)
            .or_else(|| self.vars.get(&key))
            .map(String::as_str)
    }

    fn apply(&self, value: &str) -> String {
        let mut current = value.to_string();
        for _ in 0..MAX_INTERPOLATION_PASSES {
            let next = self.apply_once(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn apply_once(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        let mut rest = value;
        while let Some(start) = rest.find("${") {
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else { break };
            let key = &after[..end];
            out.push_str(&rest[..start]);
            match self.lookup(key) {
                Some(v) => out.push_str(v),
                None => {
                    out.push_str("${");
                    out.push_str(key);
                    out.push('}');
                }
            }
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const PARENT_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <groupId>org.example</groupId>
  <artifactId>parent</artifactId>
  <version>1.0-SNAPSHOT</version>
  <packaging>pom</packaging>
  <properties>
    <lib.version>2.3</lib.version>
  </properties>
  <modules>
    <module>core</module>
  </modules>
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>org.lib</groupId>
        <artifactId>lib</artifactId>
        <version>${lib.version}</version>
      </dependency>
    </dependencies>
  </dependencyManagement>
  <repositories>
    <repository>
      <id>internal</id>
      <url>https://repo.example.org/maven</url>
    </repository>
  </repositories>
</project>
"#;

    const CHILD_POM: &str = r#"<project xmlns="http://maven.apache.org/POM/4.0.0">
  <parent>
    <groupId>org.example</groupId>
    <artifactId>parent</artifactId>
    <version>1.0-SNAPSHOT</version>
  </parent>
  <artifactId>core</artifactId>
  <build>
    <finalName>${project.artifactId}-custom</finalName>
    <plugins>
      <plugin>
        <artifactId>maven-antrun-plugin</artifactId>
        <configuration>
          <classpath>$D{org.lib:lib}</classpath>
          <out>${project.build.directory}/gen</out>
        </configuration>
        <executions>
          <execution>
            <id>run</id>
            <configuration>
              <args><arg>$D{org.lib:lib:2.3:jar:,}</arg></args>
            </configuration>
          </execution>
        </executions>
      </plugin>
    </plugins>
  </build>
  <profiles>
    <profile>
      <id>ci</id>
      <properties><imh.placeholders>true</imh.placeholders></properties>
    </profile>
  </profiles>
</project>
"#;

    fn write_tree(tmp: &TempDir) -> PathBuf {
        fs::write(tmp.path().join("pom.xml"), PARENT_POM).unwrap();
        let core = tmp.path().join("core");
        fs::create_dir_all(&core).unwrap();
        fs::write(core.join("pom.xml"), CHILD_POM).unwrap();
        core.join("pom.xml")
    }

    #[test]
    fn test_parse_with_inheritance() {
        let tmp = TempDir::new().unwrap();
        let child = write_tree(&tmp);
        let cache = ReactorModelCache::new();

        let model = PomParser::new()
            .parse(&child, &ParseOptions::default(), &cache)
            .unwrap();

        assert_eq!(model.id(), "org.example:core:1.0-SNAPSHOT");
        assert_eq!(model.packaging, "jar");
        assert_eq!(model.properties.get("lib.version").map(String::as_str), Some("2.3"));
        assert_eq!(model.build.final_name, "core-custom");
        assert!(model.build.directory.ends_with("core/target"));
        assert!(model.build.output_directory.ends_with("core/target/classes"));
        assert!(model.build.test_output_directory.ends_with("core/target/test-classes"));

        assert_eq!(model.managed_dependencies.len(), 1);
        assert_eq!(model.managed_dependencies[0].version(), "2.3");
        assert_eq!(model.repositories[0].id, "internal");

        // plugins are skipped unless requested
        assert!(model.plugins.is_empty());
        // the parent was cached for later lookups
        assert!(cache
            .get("org.example", "parent", "1.0-SNAPSHOT", RAW_TAG)
            .is_some());
    }

    #[test]
    fn test_parse_plugins() {
        let tmp = TempDir::new().unwrap();
        let child = write_tree(&tmp);
        let options = ParseOptions::default().with_plugins();

        let model = PomParser::new()
            .parse(&child, &options, &ReactorModelCache::new())
            .unwrap();

        assert_eq!(model.plugins.len(), 1);
        let plugin = &model.plugins[0];
        assert_eq!(plugin.key(), "org.apache.maven.plugins:maven-antrun-plugin");

        let config = plugin.configuration.as_ref().unwrap();
        assert_eq!(
            config.child("classpath").unwrap().value.as_deref(),
            Some("$D{org.lib:lib}")
        );
        let out = config.child("out").unwrap().value.clone().unwrap();
        assert!(out.ends_with("core/target/gen"), "out was {}", out);

        let exec = &plugin.executions[0];
        assert_eq!(exec.id, "run");
        assert_eq!(
            exec.configuration.as_ref().unwrap().leaf_values(),
            vec!["$D{org.lib:lib:2.3:jar:,}"]
        );
    }

    #[test]
    fn test_active_profile_properties() {
        let tmp = TempDir::new().unwrap();
        let child = write_tree(&tmp);
        let options = ParseOptions {
            active_profiles: vec!["ci".to_string()],
            ..ParseOptions::default()
        };

        let model = PomParser::new()
            .parse(&child, &options, &ReactorModelCache::new())
            .unwrap();
        assert_eq!(
            model.properties.get("imh.placeholders").map(String::as_str),
            Some("true")
        );
    }

    #[test]
    fn test_ancestry() {
        let tmp = TempDir::new().unwrap();
        let child = write_tree(&tmp);

        let chain = PomParser::new()
            .ancestry(&child, &ParseOptions::default(), &ReactorModelCache::new())
            .unwrap();

        let ids: Vec<String> = chain.iter().map(|m| m.artifact_id.clone()).collect();
        assert_eq!(ids, vec!["core", "parent"]);
        assert_eq!(chain[1].modules, vec!["core".to_string()]);
    }

    #[test]
    fn test_mismatched_parent_ends_chain() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("pom.xml"), PARENT_POM.replace(">parent<", ">other<")).unwrap();
        let core = tmp.path().join("core");
        fs::create_dir_all(&core).unwrap();
        fs::write(core.join("pom.xml"), CHILD_POM).unwrap();

        let chain = PomParser::new()
            .ancestry(&core.join("pom.xml"), &ParseOptions::minimal(), &ReactorModelCache::new())
            .unwrap();
        assert_eq!(chain.len(), 1);
        // groupId and version still come from the parent reference
        assert_eq!(chain[0].id(), "org.example:core:1.0-SNAPSHOT");
    }

    #[test]
    fn test_validation_levels() {
        let tmp = TempDir::new().unwrap();
        let pom = tmp.path().join("pom.xml");
        fs::write(&pom, "<project><artifactId>lonely</artifactId></project>").unwrap();
        let parser = PomParser::new();

        let strict = parser.parse(&pom, &ParseOptions::default(), &ReactorModelCache::new());
        assert!(strict.unwrap_err().to_string().contains("groupId"));

        let minimal = parser
            .parse(&pom, &ParseOptions::minimal(), &ReactorModelCache::new())
            .unwrap();
        assert_eq!(minimal.id(), ":lonely:");

        fs::write(&pom, "<project><groupId>g</groupId></project>").unwrap();
        let err = parser
            .parse(&pom, &ParseOptions::minimal(), &ReactorModelCache::new())
            .unwrap_err();
        assert!(err.to_string().contains("artifactId"));
    }

    #[test]
    fn test_rejects_non_project_documents() {
        let tmp = TempDir::new().unwrap();
        let pom = tmp.path().join("pom.xml");
        fs::write(&pom, "<settings/>").unwrap();

        let err = PomParser::new()
            .parse(&pom, &ParseOptions::minimal(), &ReactorModelCache::new())
            .unwrap_err();
        assert!(err.to_string().contains("expected <project>"));
    }

    #[test]
    fn test_interpolation_keeps_unknown_references() {
        let mut props = Properties::new();
        props.insert("a".to_string(), "${b}".to_string());
        props.insert("b".to_string(), "value".to_string());
        props.insert("self".to_string(), "${self}".to_string());
        let vars = Interpolator::new(&props, &Properties::new());

        assert_eq!(vars.apply("x-${a}-${missing}"), "x-value-${missing}");
        assert_eq!(vars.apply("${self}"), "${self}");
        assert_eq!(vars.apply("$D{g:a:${b}}"), "$D{g:a:value}");
    }
}
