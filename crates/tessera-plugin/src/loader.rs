// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin discovery.
//!
//! A [`PluginLoader`] scans its sources concurrently and merges the results:
//! first occurrence of an id wins, and the final list is ordered by
//! descending priority. Results are cached until [`PluginLoader::reset`].
//!
//! Three provenance classes exist:
//!
//! - `local`: extensions compiled into the host ([`CatalogSource`]) or kept
//!   in an in-repo directory
//! - `installed`: packages named `tessera-plugin-*` in the install directory
//! - `scoped`: packages named `@<scope>/tessera-plugin-*`

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::future::join_all;
use tessera_core::{DEFAULT_PRIORITY, TesseraError};
use tracing::{debug, info, warn};

use crate::descriptor::{Lifecycle, PluginDescriptor};
use crate::manifest::parse_plugin_manifest;

/// File name of an on-disk plugin manifest.
pub const MANIFEST_FILE: &str = "plugin.toml";

/// Directory-name prefix of installed plugin packages.
pub const PACKAGE_PREFIX: &str = "tessera-plugin-";

/// Where a discovered plugin came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, serde::Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Local,
    Installed,
    Scoped,
}

/// Something that can produce plugin descriptors.
#[async_trait]
pub trait PluginSource: Send + Sync {
    fn provenance(&self) -> Provenance;

    /// Scan for descriptors. An error drops this source's contribution only.
    async fn scan(&self) -> Result<Vec<PluginDescriptor>, TesseraError>;
}

/// Compiled-in descriptors.
#[derive(Debug, Clone, Default)]
pub struct CatalogSource {
    descriptors: Vec<PluginDescriptor>,
}

impl CatalogSource {
    pub fn new(descriptors: Vec<PluginDescriptor>) -> Self {
        Self { descriptors }
    }
}

#[async_trait]
impl PluginSource for CatalogSource {
    fn provenance(&self) -> Provenance {
        Provenance::Local
    }

    async fn scan(&self) -> Result<Vec<PluginDescriptor>, TesseraError> {
        Ok(self.descriptors.clone())
    }
}

/// Plugin packages on disk, one directory per package holding a `plugin.toml`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    provenance: Provenance,
    entries: HashMap<String, Lifecycle>,
}

impl DirectorySource {
    /// Every package directory under `root`, whatever its name.
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self::with_provenance(root, Provenance::Local)
    }

    /// `tessera-plugin-*` directories under `root`.
    pub fn installed(root: impl Into<PathBuf>) -> Self {
        Self::with_provenance(root, Provenance::Installed)
    }

    /// `@<scope>/tessera-plugin-*` directories under `root`.
    pub fn scoped(root: impl Into<PathBuf>) -> Self {
        Self::with_provenance(root, Provenance::Scoped)
    }

    fn with_provenance(root: impl Into<PathBuf>, provenance: Provenance) -> Self {
        Self {
            root: root.into(),
            provenance,
            entries: HashMap::new(),
        }
    }

    /// Make lifecycle hooks available to manifests naming `entry`.
    pub fn with_entry(mut self, entry: impl Into<String>, lifecycle: Lifecycle) -> Self {
        self.entries.insert(entry.into(), lifecycle);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn package_dirs(&self) -> Result<Vec<PathBuf>, TesseraError> {
        match self.provenance {
            Provenance::Local => subdirs(&self.root, |_| true).await,
            Provenance::Installed => {
                subdirs(&self.root, |name| name.starts_with(PACKAGE_PREFIX)).await
            }
            Provenance::Scoped => {
                let mut dirs = Vec::new();
                for scope in subdirs(&self.root, |name| name.starts_with('@')).await? {
                    match subdirs(&scope, |name| name.starts_with(PACKAGE_PREFIX)).await {
                        Ok(found) => dirs.extend(found),
                        Err(e) => warn!(scope = %scope.display(), error = %e, "failed to read plugin scope"),
                    }
                }
                Ok(dirs)
            }
        }
    }

    async fn read_package(&self, dir: &Path) -> Option<PluginDescriptor> {
        let manifest_path = dir.join(MANIFEST_FILE);
        if !is_file(&manifest_path).await {
            return None;
        }

        let content = match tokio::fs::read_to_string(&manifest_path).await {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %manifest_path.display(), error = %e, "failed to read plugin manifest");
                return None;
            }
        };

        let manifest = match parse_plugin_manifest(&content) {
            Ok(m) => m,
            Err(e) => {
                warn!(path = %manifest_path.display(), error = %e, "failed to parse plugin manifest");
                return None;
            }
        };

        let lifecycle = match manifest.entry() {
            None => Lifecycle::default(),
            Some(entry) => match self.entries.get(entry) {
                Some(lifecycle) => lifecycle.clone(),
                None => {
                    warn!(
                        path = %manifest_path.display(),
                        entry,
                        "plugin manifest names an unknown entry"
                    );
                    return None;
                }
            },
        };

        Some(manifest.into_descriptor().with_lifecycle(lifecycle))
    }
}

#[async_trait]
impl PluginSource for DirectorySource {
    fn provenance(&self) -> Provenance {
        self.provenance
    }

    async fn scan(&self) -> Result<Vec<PluginDescriptor>, TesseraError> {
        let root_is_dir = tokio::fs::metadata(&self.root)
            .await
            .is_ok_and(|meta| meta.is_dir());
        if !root_is_dir {
            debug!(root = %self.root.display(), "plugin directory does not exist");
            return Ok(Vec::new());
        }

        let mut dirs = self.package_dirs().await?;
        dirs.sort();
        let mut descriptors = Vec::with_capacity(dirs.len());
        for dir in &dirs {
            if let Some(descriptor) = self.read_package(dir).await {
                descriptors.push(descriptor);
            }
        }
        Ok(descriptors)
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|meta| meta.is_file())
}

async fn subdirs(root: &Path, keep: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>, TesseraError> {
    let storage = |e: std::io::Error| TesseraError::Storage { source: Box::new(e) };
    let mut entries = tokio::fs::read_dir(root).await.map_err(storage)?;
    let mut dirs = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(storage)? {
        let kept = entry.file_name().to_str().is_some_and(&keep);
        // Follows symlinks, so linked package directories are found too.
        if kept && tokio::fs::metadata(entry.path()).await.is_ok_and(|meta| meta.is_dir()) {
            dirs.push(entry.path());
        }
    }
    Ok(dirs)
}

/// Discovers plugins from a set of sources and caches the merged result.
#[derive(Default)]
pub struct PluginLoader {
    sources: Vec<Box<dyn PluginSource>>,
    loaded: Option<Vec<PluginDescriptor>>,
}

impl PluginLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: impl PluginSource + 'static) -> Self {
        self.add_source(source);
        self
    }

    pub fn add_source(&mut self, source: impl PluginSource + 'static) {
        self.sources.push(Box::new(source));
    }

    /// Discover plugins from every source, or return the cached result.
    pub async fn load_all_plugins(&mut self) -> Vec<PluginDescriptor> {
        if let Some(loaded) = &self.loaded {
            return loaded.clone();
        }

        let scans = join_all(self.sources.iter().map(|source| async move {
            (source.provenance(), source.scan().await)
        }))
        .await;

        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        for (provenance, result) in scans {
            let descriptors = match result {
                Ok(descriptors) => descriptors,
                Err(e) => {
                    warn!(%provenance, error = %e, "plugin source failed");
                    continue;
                }
            };

            for descriptor in descriptors {
                if descriptor.id.trim().is_empty() || descriptor.name.trim().is_empty() {
                    warn!(%provenance, plugin_id = %descriptor.id, "discarding plugin without id or name");
                    continue;
                }
                if !seen.insert(descriptor.id.clone()) {
                    warn!(%provenance, plugin_id = %descriptor.id, "duplicate plugin id, keeping first");
                    continue;
                }
                merged.push(descriptor);
            }
        }

        merged.sort_by_key(|d| Reverse(d.priority.unwrap_or(DEFAULT_PRIORITY)));
        info!(count = merged.len(), sources = self.sources.len(), "plugin discovery complete");
        self.loaded = Some(merged.clone());
        merged
    }

    /// Result of the last discovery; empty before the first one.
    pub fn loaded_plugins(&self) -> &[PluginDescriptor] {
        self.loaded.as_deref().unwrap_or_default()
    }

    /// Forget cached results so the next load re-scans.
    pub fn reset(&mut self) {
        self.loaded = None;
    }
}

impl std::fmt::Debug for PluginLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginLoader")
            .field("sources", &self.sources.iter().map(|s| s.provenance()).collect::<Vec<_>>())
            .field("loaded", &self.loaded.as_ref().map(Vec::len))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_manifest(dir: &Path, id: &str, priority: i32) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(
            dir.join(MANIFEST_FILE),
            format!(
                "[plugin]\nid = \"{id}\"\nname = \"{id} plugin\"\nversion = \"1.0.0\"\npriority = {priority}\n"
            ),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn installed_source_matches_package_prefix() {
        let tmp = tempfile::tempdir().unwrap();
        write_manifest(&tmp.path().join("tessera-plugin-export"), "export", 1);
        write_manifest(&tmp.path().join("unrelated"), "unrelated", 1);

        let found = DirectorySource::installed(tmp.path()).scan().await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "export");
    }

    #[tokio::test]
    async fn scoped_source_walks_scopes() {
        let tmp = tempfile::tempdir().unwrap();
        write_manifest(&tmp.path().join("@acme").join("tessera-plugin-sync"), "sync", 1);
        write_manifest(&tmp.path().join("acme").join("tessera-plugin-nope"), "nope", 1);

        let found = DirectorySource::scoped(tmp.path()).scan().await.unwrap();
        let ids: Vec<&str> = found.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["sync"]);
    }

    #[tokio::test]
    async fn missing_root_is_empty() {
        let found = DirectorySource::local("/nonexistent/tessera/plugins").scan().await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn broken_manifests_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        write_manifest(&tmp.path().join("good"), "good", 1);
        std::fs::create_dir_all(tmp.path().join("bad")).unwrap();
        std::fs::write(tmp.path().join("bad").join(MANIFEST_FILE), "[plugin\n").unwrap();

        let found = DirectorySource::local(tmp.path()).scan().await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn manifest_entry_binds_lifecycle() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("hooked");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(MANIFEST_FILE),
            "[plugin]\nid = \"hooked\"\nname = \"Hooked\"\nversion = \"1.0.0\"\nentry = \"hooked\"\n",
        )
        .unwrap();
        let orphan = tmp.path().join("orphan");
        std::fs::create_dir_all(&orphan).unwrap();
        std::fs::write(
            orphan.join(MANIFEST_FILE),
            "[plugin]\nid = \"orphan\"\nname = \"Orphan\"\nversion = \"1.0.0\"\nentry = \"missing\"\n",
        )
        .unwrap();

        let source = DirectorySource::local(tmp.path())
            .with_entry("hooked", Lifecycle::default().on_activate(|| async { Ok(()) }));
        let found = source.scan().await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].lifecycle.activate.is_some());
    }
}
