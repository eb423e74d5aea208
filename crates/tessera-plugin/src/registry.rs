// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin registry: validation, lifecycle and contribution aggregation.
//!
//! The `PluginRegistry` owns every validated [`Plugin`] keyed by id and tracks
//! which of them are initialized or disabled. Registration order is kept so
//! listings and dependency resolution are deterministic.
//!
//! Initialization is best-effort and non-transactional: a plugin whose hooks
//! fail is reported and disabled, plugins initialized before it stay
//! initialized, and the remaining plugins continue.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::json;
use tessera_config::PluginConfig;
use tessera_core::{ComponentLocation, PluginError, PluginId, TesseraError};
use tracing::{debug, info, trace, warn};

use crate::api::{CoreServices, PluginApi};
use crate::descriptor::{Component, HookFuture, Plugin, PluginDescriptor, Route};
use crate::handler::{LoggingErrorHandler, PluginErrorHandler};

/// Builds the capability facade handed to a plugin's `initialize` hook.
pub type ApiFactory = Arc<dyn Fn(&Plugin) -> PluginApi + Send + Sync>;

/// Lifecycle state of a known plugin id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum PluginStatus {
    /// Registered and not disabled; hooks have not completed (yet).
    Enabled,
    Initialized,
    /// Disabled by host config, a failed hook, a missing dependency or
    /// `disable_plugin`.
    Disabled,
}

/// Counts reported by [`PluginRegistry::statistics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStatistics {
    pub total: usize,
    pub enabled: usize,
    pub initialized: usize,
    pub disabled: usize,
}

/// Outcome of an initialization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitReport {
    pub initialized: usize,
    pub total: usize,
}

/// A route or component together with the plugin contributing it.
#[derive(Debug)]
pub struct Contribution<'a, T> {
    pub plugin: &'a Arc<Plugin>,
    pub item: &'a T,
}

impl<T> std::ops::Deref for Contribution<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.item
    }
}

/// Registry of plugins known to the host.
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<Plugin>>,
    order: Vec<String>,
    initialized: HashSet<String>,
    disabled: HashSet<String>,
    apis: HashMap<String, PluginApi>,
    config: PluginConfig,
    api_factory: ApiFactory,
    error_handler: Arc<dyn PluginErrorHandler>,
}

impl PluginRegistry {
    /// Create an empty registry with no host services and a logging handler.
    pub fn new() -> Self {
        Self::with_services(CoreServices::default())
    }

    /// Create an empty registry whose facades are built from `services`.
    pub fn with_services(services: CoreServices) -> Self {
        Self {
            plugins: HashMap::new(),
            order: Vec::new(),
            initialized: HashSet::new(),
            disabled: HashSet::new(),
            apis: HashMap::new(),
            config: PluginConfig::default(),
            api_factory: Arc::new(move |plugin: &Plugin| {
                PluginApi::new(plugin.id().as_str(), services.clone())
            }),
            error_handler: Arc::new(LoggingErrorHandler),
        }
    }

    pub fn set_config(&mut self, config: PluginConfig) {
        self.config = config;
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn set_api_factory(&mut self, factory: impl Fn(&Plugin) -> PluginApi + Send + Sync + 'static) {
        self.api_factory = Arc::new(factory);
    }

    pub fn set_error_handler(&mut self, handler: Arc<dyn PluginErrorHandler>) {
        self.error_handler = handler;
    }

    /// Validate and store a descriptor.
    ///
    /// A plugin the host config disables is recorded as disabled but not
    /// stored, and registration still succeeds. Every rejection is reported
    /// to the error handler before it is returned.
    pub fn register_plugin(&mut self, descriptor: PluginDescriptor) -> Result<(), TesseraError> {
        let (id, version) = match self.admit(&descriptor) {
            Ok(Some(admitted)) => admitted,
            Ok(None) => return Ok(()),
            Err(err) => {
                self.error_handler.on_load_error(&descriptor, &err);
                return Err(err.into());
            }
        };

        let key = id.to_string();
        let plugin = Plugin::from_validated(id, version, descriptor);
        info!(
            plugin_id = %key,
            version = %plugin.version(),
            routes = plugin.routes().len(),
            components = plugin.components().len(),
            "plugin registered"
        );
        self.plugins.insert(key.clone(), Arc::new(plugin));
        self.order.push(key);
        Ok(())
    }

    /// Runs every registration check. `Ok(None)` means disabled by config.
    fn admit(
        &mut self,
        descriptor: &PluginDescriptor,
    ) -> Result<Option<(PluginId, semver::Version)>, PluginError> {
        if self.plugins.contains_key(&descriptor.id) {
            return Err(PluginError::load(
                &descriptor.id,
                format!("plugin `{}` is already registered", descriptor.id),
            ));
        }

        let (id, version) = descriptor.validate()?;

        if self.config.is_disabled(id.as_str()) {
            trace!(plugin_id = %id, "plugin disabled by configuration");
            self.disabled.insert(id.to_string());
            return Ok(None);
        }

        if let Some(requirement) = self
            .config
            .settings(id.as_str())
            .and_then(|s| s.version.as_deref())
        {
            let req = semver::VersionReq::parse(requirement).map_err(|e| {
                PluginError::load(id.as_str(), format!("invalid version requirement `{requirement}`"))
                    .with_cause(&e)
            })?;
            if !req.matches(&version) {
                return Err(PluginError::load(
                    id.as_str(),
                    format!("version {version} does not satisfy requirement `{requirement}`"),
                ));
            }
        }

        if let Some(max) = self.config.max_plugins
            && self.plugins.len() >= max
        {
            return Err(PluginError::load(
                id.as_str(),
                format!("plugin limit of {max} reached"),
            ));
        }

        Ok(Some((id, version)))
    }

    /// Get a registered plugin by id.
    pub fn plugin(&self, id: &str) -> Option<&Arc<Plugin>> {
        self.plugins.get(id)
    }

    /// All stored plugins in registration order, disabled ones included.
    pub fn all_plugins(&self) -> Vec<&Arc<Plugin>> {
        self.order.iter().filter_map(|id| self.plugins.get(id)).collect()
    }

    /// Stored plugins that are not disabled, in registration order.
    pub fn enabled_plugins(&self) -> Vec<&Arc<Plugin>> {
        self.order
            .iter()
            .filter(|id| !self.disabled.contains(*id))
            .filter_map(|id| self.plugins.get(id))
            .collect()
    }

    pub fn status(&self, id: &str) -> Option<PluginStatus> {
        if self.disabled.contains(id) {
            Some(PluginStatus::Disabled)
        } else if self.initialized.contains(id) {
            Some(PluginStatus::Initialized)
        } else if self.plugins.contains_key(id) {
            Some(PluginStatus::Enabled)
        } else {
            None
        }
    }

    pub fn is_initialized(&self, id: &str) -> bool {
        self.initialized.contains(id)
    }

    pub fn is_disabled(&self, id: &str) -> bool {
        self.disabled.contains(id)
    }

    /// The capability facade built for `id`, once its `initialize` hook ran.
    pub fn api(&self, id: &str) -> Option<&PluginApi> {
        self.apis.get(id)
    }

    /// Initialize every enabled plugin in dependency order.
    ///
    /// Hooks are bounded by the configured timeout when one is set.
    pub async fn initialize_plugins(&mut self) -> InitReport {
        let limit = self.config.timeout;
        self.run_initialization(limit).await
    }

    /// Like [`initialize_plugins`](Self::initialize_plugins) with every hook
    /// bounded by `limit`. A hook that overruns counts as an init failure.
    pub async fn initialize_plugins_with_timeout(&mut self, limit: Duration) -> InitReport {
        self.run_initialization(Some(limit)).await
    }

    async fn run_initialization(&mut self, limit: Option<Duration>) -> InitReport {
        let enabled: Vec<Arc<Plugin>> = self.enabled_plugins().into_iter().cloned().collect();
        if enabled.is_empty() {
            info!("no plugins to initialize");
            return InitReport::default();
        }

        let sorted = sort_by_dependencies(&enabled);
        let total = sorted.len();

        for plugin in &sorted {
            let id = plugin.id().to_string();
            if self.initialized.contains(&id) {
                continue;
            }

            let missing: Vec<String> = plugin
                .dependencies()
                .iter()
                .filter(|dep| !self.is_available(dep))
                .cloned()
                .collect();
            if !missing.is_empty() {
                self.error_handler.on_dependency_error(plugin, &missing);
                self.disabled.insert(id);
                continue;
            }

            match self.run_hooks(plugin, limit).await {
                Ok(api) => {
                    debug!(plugin_id = %id, "plugin initialized");
                    if let Some(api) = api {
                        self.apis.insert(id.clone(), api);
                    }
                    self.initialized.insert(id);
                }
                Err(err) => {
                    self.error_handler.on_init_error(plugin, &err);
                    self.disabled.insert(id);
                }
            }
        }

        let initialized = sorted
            .iter()
            .filter(|p| self.initialized.contains(p.id().as_str()))
            .count();
        info!(initialized, total, "plugin initialization complete");
        InitReport { initialized, total }
    }

    fn is_available(&self, id: &str) -> bool {
        self.plugins.contains_key(id) && !self.disabled.contains(id)
    }

    async fn run_hooks(
        &mut self,
        plugin: &Arc<Plugin>,
        limit: Option<Duration>,
    ) -> Result<Option<PluginApi>, PluginError> {
        let id = plugin.id().as_str();
        let lifecycle = plugin.lifecycle();

        let mut api = None;
        if let Some(initialize) = &lifecycle.initialize {
            let facade = self.build_api(plugin);
            bounded(initialize(facade.clone()), limit)
                .await
                .map_err(|e| PluginError::init(id, "initialize hook failed").with_cause(&e))?;
            api = Some(facade);
        }

        if let Some(activate) = &lifecycle.activate {
            bounded(activate(), limit)
                .await
                .map_err(|e| PluginError::init(id, "activate hook failed").with_cause(&e))?;
        }

        Ok(api)
    }

    /// Builds a facade with config defaults layered as descriptor < host.
    fn build_api(&self, plugin: &Plugin) -> PluginApi {
        let api = (self.api_factory)(plugin);
        if let Some(settings) = self.config.settings(plugin.id().as_str()) {
            api.seed_config(settings.config.clone().into_iter().collect());
        }
        api.seed_config(plugin.config().clone());
        api
    }

    /// Disable a plugin, running its `deactivate` hook if it was initialized.
    ///
    /// Unknown ids are ignored with a warning. Hook failures are reported to
    /// the error handler and never returned.
    pub async fn disable_plugin(&mut self, id: &str) {
        let Some(plugin) = self.plugins.get(id).cloned() else {
            warn!(plugin_id = id, "cannot disable unknown plugin");
            return;
        };

        if self.initialized.remove(id)
            && let Some(deactivate) = &plugin.lifecycle().deactivate
            && let Err(e) = deactivate().await
        {
            let err = PluginError::runtime(id, "deactivate hook failed").with_cause(&e);
            self.error_handler
                .on_runtime_error(&plugin, &err, &json!({ "action": "disable" }));
        }

        self.disabled.insert(id.to_string());
        info!(plugin_id = id, "plugin disabled");
    }

    /// Ordering priority of a plugin, honouring a host override.
    pub fn effective_priority(&self, plugin: &Plugin) -> i32 {
        self.config
            .settings(plugin.id().as_str())
            .and_then(|s| s.priority)
            .unwrap_or_else(|| plugin.priority())
    }

    /// Routes of enabled plugins ordered by plugin then route priority.
    pub fn routes(&self) -> Vec<Contribution<'_, Route>> {
        let mut routes: Vec<Contribution<'_, Route>> = self
            .enabled_plugins()
            .into_iter()
            .flat_map(|plugin| {
                plugin
                    .routes()
                    .iter()
                    .map(move |item| Contribution { plugin, item })
            })
            .collect();
        routes.sort_by_key(|c| (self.effective_priority(c.plugin), c.item.effective_priority()));
        routes
    }

    /// Components of enabled plugins ordered by position, optionally filtered
    /// by location.
    pub fn components(&self, location: Option<ComponentLocation>) -> Vec<Contribution<'_, Component>> {
        let mut components: Vec<Contribution<'_, Component>> = self
            .enabled_plugins()
            .into_iter()
            .flat_map(|plugin| {
                plugin
                    .components()
                    .iter()
                    .map(move |item| Contribution { plugin, item })
            })
            .filter(|c| location.is_none_or(|loc| c.item.position.location == loc))
            .collect();
        components.sort_by_key(|c| c.item.effective_order());
        components
    }

    pub fn statistics(&self) -> RegistryStatistics {
        let total = self.plugins.len();
        RegistryStatistics {
            total,
            enabled: self
                .plugins
                .keys()
                .filter(|id| !self.disabled.contains(*id))
                .count(),
            initialized: self.initialized.len(),
            disabled: self.disabled.len(),
        }
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.order)
            .field("initialized", &self.initialized)
            .field("disabled", &self.disabled)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Await `future`, failing with [`TesseraError::Timeout`] once `duration`
/// elapses. The future is dropped on timeout.
pub async fn with_timeout<T>(
    future: impl Future<Output = Result<T, TesseraError>>,
    duration: Duration,
) -> Result<T, TesseraError> {
    tokio::time::timeout(duration, future)
        .await
        .map_err(|_| TesseraError::Timeout { duration })?
}

async fn bounded(future: HookFuture, limit: Option<Duration>) -> Result<(), TesseraError> {
    match limit {
        Some(duration) => with_timeout(future, duration).await,
        None => future.await,
    }
}

#[derive(Clone, Copy)]
enum Mark {
    Visiting,
    Done,
}

/// Depth-first topological sort. Dependencies outside `plugins` are skipped;
/// cycles are logged and broken. Every plugin appears exactly once.
fn sort_by_dependencies(plugins: &[Arc<Plugin>]) -> Vec<Arc<Plugin>> {
    let index: HashMap<&str, &Arc<Plugin>> =
        plugins.iter().map(|p| (p.id().as_str(), p)).collect();
    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut sorted = Vec::with_capacity(plugins.len());

    for plugin in plugins {
        visit(plugin, &index, &mut marks, &mut sorted);
    }
    sorted
}

fn visit<'a>(
    plugin: &'a Arc<Plugin>,
    index: &HashMap<&'a str, &'a Arc<Plugin>>,
    marks: &mut HashMap<&'a str, Mark>,
    sorted: &mut Vec<Arc<Plugin>>,
) {
    let id = plugin.id().as_str();
    match marks.get(id) {
        Some(Mark::Done) => return,
        Some(Mark::Visiting) => {
            warn!(plugin_id = id, "circular dependency detected");
            return;
        }
        None => {}
    }

    marks.insert(id, Mark::Visiting);
    for dep in plugin.dependencies() {
        if let Some(dep_plugin) = index.get(dep.as_str()) {
            visit(dep_plugin, index, marks, sorted);
        }
    }
    marks.insert(id, Mark::Done);
    sorted.push(Arc::clone(plugin));
}
