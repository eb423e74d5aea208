// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for plugin discovery.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tessera_core::TesseraError;
use tessera_plugin::{
    CatalogSource, DirectorySource, PluginDescriptor, PluginLoader, PluginRegistry, PluginSource,
    Provenance, builtin_catalog,
};
use tessera_test_utils::EventLog;

struct FailingSource;

#[async_trait]
impl PluginSource for FailingSource {
    fn provenance(&self) -> Provenance {
        Provenance::Installed
    }

    async fn scan(&self) -> Result<Vec<PluginDescriptor>, TesseraError> {
        Err(TesseraError::Internal("registry mirror offline".into()))
    }
}

struct CountingSource {
    scans: Arc<AtomicUsize>,
}

#[async_trait]
impl PluginSource for CountingSource {
    fn provenance(&self) -> Provenance {
        Provenance::Local
    }

    async fn scan(&self) -> Result<Vec<PluginDescriptor>, TesseraError> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        Ok(vec![PluginDescriptor::new("counted", "Counted", "1.0.0")])
    }
}

/// Records when the wrapped source starts and finishes scanning.
struct Traced<S> {
    name: &'static str,
    inner: S,
    log: EventLog,
}

#[async_trait]
impl<S: PluginSource> PluginSource for Traced<S> {
    fn provenance(&self) -> Provenance {
        self.inner.provenance()
    }

    async fn scan(&self) -> Result<Vec<PluginDescriptor>, TesseraError> {
        self.log.push(format!("{}:start", self.name));
        let found = self.inner.scan().await;
        self.log.push(format!("{}:end", self.name));
        found
    }
}

fn descriptor(id: &str, priority: Option<i32>) -> PluginDescriptor {
    let mut d = PluginDescriptor::new(id, format!("{id} plugin"), "1.0.0");
    d.priority = priority;
    d
}

fn write_package(dir: &Path, id: &str, priority: i32) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(
        dir.join("plugin.toml"),
        format!(
            "[plugin]\nid = \"{id}\"\nname = \"{id}\"\nversion = \"0.1.0\"\npriority = {priority}\n\n\
             [[routes]]\npath = \"/{id}\"\nview = \"{id}-view\"\n"
        ),
    )
    .unwrap();
}

#[tokio::test]
async fn merges_sources_first_wins_and_sorts_by_priority() {
    let mut loader = PluginLoader::new()
        .with_source(CatalogSource::new(vec![
            descriptor("low", Some(1)),
            descriptor("shared", Some(50)),
        ]))
        .with_source(CatalogSource::new(vec![
            descriptor("high", Some(900)),
            descriptor("shared", Some(5000)),
            descriptor("same-a", None),
            descriptor("same-b", None),
        ]));

    let loaded = loader.load_all_plugins().await;
    let ids: Vec<&str> = loaded.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, ["same-a", "same-b", "high", "shared", "low"]);
    assert_eq!(loaded[3].priority, Some(50));
}

#[tokio::test]
async fn failing_source_contributes_nothing() {
    let mut loader = PluginLoader::new()
        .with_source(FailingSource)
        .with_source(CatalogSource::new(builtin_catalog()));

    let loaded = loader.load_all_plugins().await;
    assert_eq!(loaded.len(), 2);
}

#[tokio::test]
async fn modules_without_id_or_name_are_discarded() {
    let mut loader = PluginLoader::new().with_source(CatalogSource::new(vec![
        PluginDescriptor::new("", "No id", "1.0.0"),
        PluginDescriptor::new("no-name", " ", "1.0.0"),
        descriptor("ok", None),
    ]));
    let ids: Vec<String> = loader.load_all_plugins().await.into_iter().map(|d| d.id).collect();
    assert_eq!(ids, ["ok"]);
}

#[tokio::test]
async fn results_are_cached_until_reset() {
    let scans = Arc::new(AtomicUsize::new(0));
    let mut loader = PluginLoader::new().with_source(CountingSource {
        scans: scans.clone(),
    });
    assert!(loader.loaded_plugins().is_empty());

    loader.load_all_plugins().await;
    loader.load_all_plugins().await;
    assert_eq!(scans.load(Ordering::SeqCst), 1);
    assert_eq!(loader.loaded_plugins().len(), 1);

    loader.reset();
    assert!(loader.loaded_plugins().is_empty());
    loader.load_all_plugins().await;
    assert_eq!(scans.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn discovers_all_three_provenance_classes() {
    let tmp = tempfile::tempdir().unwrap();
    let local = tmp.path().join("extensions");
    let installed = tmp.path().join("node_modules");
    write_package(&local.join("entry-export"), "entry-export", 300);
    write_package(&installed.join("tessera-plugin-bulk-edit"), "bulk-edit", 250);
    write_package(&installed.join("@acme").join("tessera-plugin-sync"), "acme-sync", 10);

    let mut loader = PluginLoader::new()
        .with_source(CatalogSource::new(builtin_catalog()))
        .with_source(DirectorySource::local(&local))
        .with_source(DirectorySource::installed(&installed))
        .with_source(DirectorySource::scoped(&installed));

    let loaded = loader.load_all_plugins().await;
    let ids: Vec<&str> = loaded.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(
        ids,
        ["entry-export", "bulk-edit", "role-inspector", "acl-audit", "acme-sync"]
    );

    let mut registry = PluginRegistry::new();
    for descriptor in loaded {
        registry.register_plugin(descriptor).unwrap();
    }
    let report = registry.initialize_plugins().await;
    assert_eq!(report.initialized, 5);
    assert!(registry.routes().iter().any(|r| r.path == "/bulk-edit"));
}

#[tokio::test]
async fn file_in_place_of_root_is_treated_as_absent() {
    let tmp = tempfile::tempdir().unwrap();
    let file_root = tmp.path().join("not-a-dir");
    std::fs::write(&file_root, "").unwrap();

    let found = DirectorySource::installed(&file_root).scan().await.unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn directory_scan_yields_to_other_sources() {
    let tmp = tempfile::tempdir().unwrap();
    for n in 0..4 {
        write_package(&tmp.path().join(format!("tessera-plugin-pkg{n}")), &format!("pkg{n}"), 10);
    }

    let log = EventLog::new();
    let mut loader = PluginLoader::new()
        .with_source(Traced {
            name: "installed",
            inner: DirectorySource::installed(tmp.path()),
            log: log.clone(),
        })
        .with_source(Traced {
            name: "catalog",
            inner: CatalogSource::new(builtin_catalog()),
            log: log.clone(),
        });

    let loaded = loader.load_all_plugins().await;
    assert_eq!(loaded.len(), 6);
    let catalog_start = log.position("catalog:start").unwrap();
    let installed_end = log.position("installed:end").unwrap();
    assert!(
        catalog_start < installed_end,
        "directory scan blocked the other sources: {:?}",
        log.events()
    );
}
