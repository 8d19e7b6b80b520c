//! Build-time cache configuration.
//!
//! The current generation and its asset manifest come from `offline_cache.toml`, validated and
//! baked into [`CACHE_GENERATION`] and [`ASSET_MANIFEST`] by the build script. Nothing is read at
//! runtime.

use std::{collections::HashSet, fmt};

use crate::error::ConfigError;

include!(concat!(env!("OUT_DIR"), "/offline_cache_generated.rs"));

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Name of one generation of cached assets.
pub struct CacheGeneration(String);

impl CacheGeneration {
    /// Validates and wraps a generation name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyGeneration`] for an empty or whitespace name.
    pub fn new(name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::EmptyGeneration);
        }
        Ok(Self(name))
    }

    /// Returns the generation name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Ordered resource identifiers a generation must hold to be ready.
pub struct AssetManifest(Vec<String>);

impl AssetManifest {
    /// Validates and wraps a list of resource identifiers, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyAssetId`] for a blank entry and
    /// [`ConfigError::DuplicateAsset`] when an identifier repeats. Bulk populate rejects
    /// duplicate requests, so a duplicate would make every install fail.
    pub fn new<I, S>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries: Vec<String> = entries.into_iter().map(Into::into).collect();
        let mut seen = HashSet::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if entry.trim().is_empty() {
                return Err(ConfigError::EmptyAssetId { index });
            }
            if !seen.insert(entry.as_str()) {
                return Err(ConfigError::DuplicateAsset(entry.clone()));
            }
        }
        Ok(Self(entries))
    }

    /// Identifiers in pre-cache order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Number of identifiers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when nothing is pre-cached.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Generation plus manifest handed to [`crate::OfflineCacheAgent`].
pub struct OfflineCacheConfig {
    generation: CacheGeneration,
    manifest: AssetManifest,
}

impl OfflineCacheConfig {
    /// Pairs a generation with its manifest.
    pub fn new(generation: CacheGeneration, manifest: AssetManifest) -> Self {
        Self {
            generation,
            manifest,
        }
    }

    /// Configuration baked in at build time.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the generated constants fail validation. The build script
    /// applies the same checks, so this only fails if the two drift apart.
    pub fn built_in() -> Result<Self, ConfigError> {
        Ok(Self::new(
            CacheGeneration::new(CACHE_GENERATION)?,
            AssetManifest::new(ASSET_MANIFEST.iter().copied())?,
        ))
    }

    /// The current generation.
    pub fn generation(&self) -> &CacheGeneration {
        &self.generation
    }

    /// The asset manifest.
    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn built_in_config_matches_generated_constants() {
        let config = OfflineCacheConfig::built_in().expect("built-in config");
        assert_eq!(config.generation().as_str(), CACHE_GENERATION);
        assert_eq!(config.manifest().len(), ASSET_MANIFEST.len());
        assert_eq!(
            config.manifest().as_slice(),
            ASSET_MANIFEST
                .iter()
                .map(|asset| asset.to_string())
                .collect::<Vec<_>>()
                .as_slice()
        );
    }

    #[test]
    fn built_in_manifest_pre_caches_the_page_shell() {
        assert_eq!(CACHE_GENERATION, "course-go-cache-v1");
        assert_eq!(
            ASSET_MANIFEST,
            &["/", "/api/v1/magasin_data/M001", "/static/icon.png"]
        );
    }

    #[test]
    fn generation_rejects_blank_names() {
        assert_eq!(CacheGeneration::new(""), Err(ConfigError::EmptyGeneration));
        assert_eq!(CacheGeneration::new("  "), Err(ConfigError::EmptyGeneration));
        assert_eq!(CacheGeneration::new("v2").expect("v2").to_string(), "v2");
    }

    #[test]
    fn manifest_rejects_blank_and_duplicate_entries() {
        assert_eq!(
            AssetManifest::new(["/", " "]),
            Err(ConfigError::EmptyAssetId { index: 1 })
        );
        assert_eq!(
            AssetManifest::new(["/", "/static/icon.png", "/"]),
            Err(ConfigError::DuplicateAsset("/".to_string()))
        );
    }

    #[test]
    fn manifest_keeps_declared_order() {
        let manifest = AssetManifest::new(["/c", "/a", "/b"]).expect("manifest");
        assert_eq!(manifest.as_slice(), &["/c", "/a", "/b"]);
        assert!(!manifest.is_empty());
        assert!(AssetManifest::new(Vec::<String>::new())
            .expect("empty manifest")
            .is_empty());
    }
}
