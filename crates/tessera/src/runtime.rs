// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup sequence: core services, discovery, registration, initialization.

use std::sync::Arc;

use tessera_config::{RuntimeConfig, TesseraConfig};
use tessera_plugin::{
    CatalogSource, CoreServices, DirectorySource, InitReport, JsonFileStore, PluginLoader,
    PluginRegistry, builtin_catalog,
};
use tracing::{debug, info};

/// Host services available to plugins started from the command line.
pub fn core_services(runtime: &RuntimeConfig) -> CoreServices {
    CoreServices {
        store: Some(Arc::new(JsonFileStore::new(&runtime.store_path))),
        ..CoreServices::default()
    }
}

/// Loader over the compiled-in catalog and the configured directories.
pub fn build_loader(runtime: &RuntimeConfig) -> PluginLoader {
    let mut loader = PluginLoader::new().with_source(CatalogSource::new(builtin_catalog()));
    if let Some(local_dir) = &runtime.local_dir {
        loader.add_source(DirectorySource::local(local_dir));
    }
    loader
        .with_source(DirectorySource::installed(&runtime.install_dir))
        .with_source(DirectorySource::scoped(&runtime.install_dir))
}

/// Discover, register and initialize every plugin.
pub async fn bootstrap(config: &TesseraConfig) -> (PluginRegistry, InitReport) {
    let mut registry = PluginRegistry::with_services(core_services(&config.runtime));
    registry.set_config(config.plugin_config());

    let mut loader = build_loader(&config.runtime);
    for descriptor in loader.load_all_plugins().await {
        let id = descriptor.id.clone();
        // Rejections are already reported through the registry's error handler.
        if let Err(e) = registry.register_plugin(descriptor) {
            debug!(plugin_id = %id, error = %e, "plugin skipped");
        }
    }

    let report = registry.initialize_plugins().await;
    info!(
        initialized = report.initialized,
        total = report.total,
        "plugin runtime ready"
    );
    (registry, report)
}
