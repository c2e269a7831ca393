//! ReactorModelCache - parsed descriptors shared across one parse session.
//!
//! Keyed `groupId -> artifactId -> version -> tag`. Every level is its own
//! concurrent map, so nested parent lookups from several threads may
//! populate it at once; a racing insert of the same key only repeats work.

use dashmap::DashMap;

/// Tag for descriptors parsed without plugin processing.
pub const RAW_TAG: &str = "raw";

type TagMap<V> = DashMap<String, V>;
type VersionMap<V> = DashMap<String, TagMap<V>>;
type ArtifactMap<V> = DashMap<String, VersionMap<V>>;

/// Four-level model cache.
#[derive(Debug)]
pub struct ReactorModelCache<V> {
    cache: DashMap<String, ArtifactMap<V>>,
}

impl<V: Clone> ReactorModelCache<V> {
    /// Create an empty cache.
    pub fn new() -> Self {
        ReactorModelCache {
            cache: DashMap::new(),
        }
    }

    /// Look up a cached value.
    pub fn get(&self, group_id: &str, artifact_id: &str, version: &str, tag: &str) -> Option<V> {
        let artifacts = self.cache.get(group_id)?;
        let versions = artifacts.get(artifact_id)?;
        let tags = versions.get(version)?;
        let value = tags.get(tag)?;
        Some(value.value().clone())
    }

    /// Store a value, replacing any previous one for the same key.
    pub fn put(&self, group_id: &str, artifact_id: &str, version: &str, tag: &str, value: V) {
        let artifacts = self.cache.entry(group_id.to_string()).or_default();
        let versions = artifacts.entry(artifact_id.to_string()).or_default();
        let tags = versions.entry(version.to_string()).or_default();
        tags.insert(tag.to_string(), value);
    }

    /// Whether nothing has been cached.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl<V: Clone> Default for ReactorModelCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn test_get_put() {
        let cache = ReactorModelCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.get("g", "a", "1", RAW_TAG), None::<String>);

        cache.put("g", "a", "1", RAW_TAG, "model".to_string());
        assert_eq!(cache.get("g", "a", "1", RAW_TAG).as_deref(), Some("model"));
        assert_eq!(cache.get("g", "a", "1", "full"), None);
        assert_eq!(cache.get("g", "a", "2", RAW_TAG), None);
    }

    #[test]
    fn test_concurrent_population() {
        let cache = ReactorModelCache::new();
        (0..256).into_par_iter().for_each(|i| {
            let version = (i % 4).to_string();
            cache.put("g", "parent", &version, RAW_TAG, i % 4);
        });

        for v in 0..4 {
            assert_eq!(cache.get("g", "parent", &v.to_string(), RAW_TAG), Some(v));
        }
    }
}
