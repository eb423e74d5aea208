// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin manifest parsing from `plugin.toml` files.
//!
//! Manifests describe plugins shipped as packages on disk. Their routes and
//! components reference host views by name; lifecycle hooks come from a
//! compiled-in entry the loader binds by the manifest's `entry` field.

use serde::Deserialize;
use serde_json::{Map, Value};
use tessera_core::{ComponentLocation, Layout, TesseraError, TriggerKind};

use crate::descriptor::{Component, NamedView, PluginDescriptor, Route, Trigger};

/// A parsed `plugin.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginManifest {
    pub plugin: PluginSection,
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
    #[serde(default)]
    pub components: Vec<ComponentEntry>,
    #[serde(default)]
    pub config: Map<String, Value>,
}

/// The `[plugin]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginSection {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub priority: Option<i32>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub peer_dependencies: Vec<String>,
    /// Name of the compiled-in module providing lifecycle hooks.
    pub entry: Option<String>,
}

/// A `[[routes]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteEntry {
    pub path: String,
    pub view: String,
    pub priority: Option<i32>,
    #[serde(default, rename = "override")]
    pub overrides_native: bool,
    #[serde(default)]
    pub layout: Layout,
}

/// A `[[components]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentEntry {
    pub id: String,
    pub view: String,
    #[serde(default)]
    pub location: ComponentLocation,
    pub order: Option<i32>,
    #[serde(default)]
    pub trigger: TriggerKind,
    pub target: Option<String>,
}

impl PluginManifest {
    pub fn entry(&self) -> Option<&str> {
        self.plugin.entry.as_deref()
    }

    /// Convert into a descriptor without lifecycle hooks.
    pub fn into_descriptor(self) -> PluginDescriptor {
        let section = self.plugin;
        let mut descriptor = PluginDescriptor::new(section.id, section.name, section.version);
        descriptor.description = section.description;
        descriptor.priority = section.priority;
        for dep in section.dependencies {
            descriptor = descriptor.with_dependency(dep);
        }
        for peer in section.peer_dependencies {
            descriptor = descriptor.with_peer_dependency(peer);
        }

        for entry in self.routes {
            let mut route = Route::new(entry.path, NamedView::new(entry.view)).with_layout(entry.layout);
            route.priority = entry.priority;
            route.overrides_native = entry.overrides_native;
            descriptor = descriptor.with_route(route);
        }

        for entry in self.components {
            let mut trigger = Trigger::new(entry.trigger);
            trigger.target = entry.target;
            let mut component =
                Component::new(entry.id, NamedView::new(entry.view), entry.location).with_trigger(trigger);
            component.position.order = entry.order;
            descriptor = descriptor.with_component(component);
        }

        descriptor.config = self.config;
        descriptor
    }
}

/// Parse a plugin manifest from TOML content.
///
/// Checks that id, name and version are present; full descriptor validation
/// happens at registration.
pub fn parse_plugin_manifest(toml_content: &str) -> Result<PluginManifest, TesseraError> {
    let manifest: PluginManifest = toml::from_str(toml_content)
        .map_err(|e| TesseraError::Config(format!("invalid plugin manifest: {e}")))?;

    for (field, value) in [
        ("id", &manifest.plugin.id),
        ("name", &manifest.plugin.name),
        ("version", &manifest.plugin.version),
    ] {
        if value.trim().is_empty() {
            return Err(TesseraError::Config(format!(
                "plugin manifest: {field} must not be empty"
            )));
        }
    }

    Ok(manifest)
}
