// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin runtime for the catalog administration host.
//!
//! Descriptors are discovered by a [`PluginLoader`], validated and
//! initialized by a [`PluginRegistry`], and handed a per-plugin
//! [`PluginApi`] to reach host services. Rendered contributions are wrapped
//! in a [`FaultBoundary`] so one failing plugin cannot take the host down.

pub mod api;
pub mod boundary;
pub mod catalog;
pub mod descriptor;
pub mod handler;
pub mod loader;
pub mod manifest;
pub mod registry;
pub mod store;

pub use api::{
    CoreServices, DataClient, Method, NavigateOptions, Navigator, NotificationOptions, Notifier,
    PluginApi,
};
pub use boundary::{BoundaryState, Fault, FaultBoundary, FaultKind};
pub use catalog::builtin_catalog;
pub use descriptor::{
    Component, GuardOutcome, Lifecycle, Markup, NamedView, Plugin, PluginDescriptor, Renderable,
    Route, RouteGuard, SharedRenderable, Trigger, renderer,
};
pub use handler::{LoggingErrorHandler, PluginErrorHandler};
pub use loader::{CatalogSource, DirectorySource, PluginLoader, PluginSource, Provenance};
pub use manifest::{PluginManifest, parse_plugin_manifest};
pub use registry::{
    Contribution, InitReport, PluginRegistry, PluginStatus, RegistryStatistics, with_timeout,
};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
