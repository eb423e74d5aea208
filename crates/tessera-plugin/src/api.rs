// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-plugin capability facade.
//!
//! A [`PluginApi`] is built once for each plugin at initialization time from
//! the host's [`CoreServices`]. It exposes four capability groups:
//!
//! - [`ConfigApi`]: plugin-scoped settings, persisted best-effort
//! - [`UiApi`]: runtime components, modals and notifications
//! - [`RoutingApi`]: runtime routes and navigation
//! - [`DataApi`]: calls through the host's data client
//!
//! Missing host services degrade to logging defaults. Capability calls never
//! panic into the host; data calls without a client return
//! [`TesseraError::ApiUnavailable`] to the calling plugin.

use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::{Map, Value};
use strum::Display;
use tessera_core::{NotificationKind, TesseraError};
use tracing::{debug, error, info, warn};

use crate::descriptor::{Component, Renderable, Route, SharedRenderable};
use crate::store::KeyValueStore;

/// Host navigation function.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str, options: &NavigateOptions);
}

/// Options forwarded to the host navigator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigateOptions {
    /// Replace the current history entry instead of pushing.
    pub replace: bool,
    pub state: Option<Value>,
}

/// Host notification dispatcher.
pub trait Notifier: Send + Sync {
    fn enqueue(&self, message: &str, options: &NotificationOptions);
}

/// Options forwarded to the host notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationOptions {
    pub kind: NotificationKind,
    pub plugin_id: String,
}

/// HTTP verb of a data call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// Host HTTP-capable client.
#[async_trait]
pub trait DataClient: Send + Sync {
    /// Whether this client implements `method`. Unsupported verbs are
    /// reported to plugins as an unavailable API.
    fn supports(&self, _method: Method) -> bool {
        true
    }

    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        payload: Option<Value>,
    ) -> Result<Value, TesseraError>;
}

/// Opaque read-only host object (theme, i18n).
pub type HostObject = Arc<dyn Any + Send + Sync>;

/// Host services a facade is built from. Every field is optional.
#[derive(Clone, Default)]
pub struct CoreServices {
    pub navigator: Option<Arc<dyn Navigator>>,
    pub notifier: Option<Arc<dyn Notifier>>,
    pub theme: Option<HostObject>,
    pub i18n: Option<HostObject>,
    pub client: Option<Arc<dyn DataClient>>,
    pub store: Option<Arc<dyn KeyValueStore>>,
}

impl std::fmt::Debug for CoreServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreServices")
            .field("navigator", &self.navigator.is_some())
            .field("notifier", &self.notifier.is_some())
            .field("theme", &self.theme.is_some())
            .field("i18n", &self.i18n.is_some())
            .field("client", &self.client.is_some())
            .field("store", &self.store.is_some())
            .finish()
    }
}

/// A modal opened by a plugin.
#[derive(Clone)]
pub struct Modal {
    pub id: String,
    pub title: String,
    pub content: SharedRenderable,
}

struct ApiState {
    plugin_id: String,
    services: CoreServices,
    config: Mutex<Map<String, Value>>,
    written: Mutex<Map<String, Value>>,
    components: Mutex<Vec<Component>>,
    routes: Mutex<Vec<Route>>,
    modals: Mutex<Vec<Modal>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Capability facade handed to a plugin's `initialize` hook.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct PluginApi {
    state: Arc<ApiState>,
}

impl PluginApi {
    pub fn new(plugin_id: impl Into<String>, services: CoreServices) -> Self {
        Self {
            state: Arc::new(ApiState {
                plugin_id: plugin_id.into(),
                services,
                config: Mutex::new(Map::new()),
                written: Mutex::new(Map::new()),
                components: Mutex::new(Vec::new()),
                routes: Mutex::new(Vec::new()),
                modals: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn plugin_id(&self) -> &str {
        &self.state.plugin_id
    }

    pub fn config(&self) -> ConfigApi<'_> {
        ConfigApi { state: &self.state }
    }

    pub fn ui(&self) -> UiApi<'_> {
        UiApi { state: &self.state }
    }

    pub fn routing(&self) -> RoutingApi<'_> {
        RoutingApi { state: &self.state }
    }

    pub fn data(&self) -> DataApi<'_> {
        DataApi { state: &self.state }
    }

    /// The host theme, if one was supplied and is of type `T`.
    pub fn theme<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.state.services.theme.clone()?.downcast::<T>().ok()
    }

    /// The host i18n object, if one was supplied and is of type `T`.
    pub fn i18n<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.state.services.i18n.clone()?.downcast::<T>().ok()
    }

    /// Layers default values under whatever the plugin later sets.
    pub(crate) fn seed_config(&self, defaults: Map<String, Value>) {
        let mut config = lock(&self.state.config);
        for (key, value) in defaults {
            config.entry(key).or_insert(value);
        }
    }
}

impl std::fmt::Debug for PluginApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginApi")
            .field("plugin_id", &self.state.plugin_id)
            .field("services", &self.state.services)
            .finish_non_exhaustive()
    }
}

/// Plugin-scoped configuration values.
pub struct ConfigApi<'a> {
    state: &'a ApiState,
}

impl ConfigApi<'_> {
    fn storage_key(&self) -> String {
        format!("tessera:plugin:{}:config", self.state.plugin_id)
    }

    /// Reads the stored map. `Ok(None)` when nothing usable is stored
    /// (no store, no entry, or corrupt data); `Err` when the read failed.
    fn load_stored(&self, store: &dyn KeyValueStore) -> Result<Option<Map<String, Value>>, TesseraError> {
        let Some(raw) = store.get_item(&self.storage_key())? else {
            return Ok(None);
        };
        match serde_json::from_str::<Map<String, Value>>(&raw) {
            Ok(map) => Ok(Some(map)),
            Err(e) => {
                debug!(plugin_id = %self.state.plugin_id, error = %e, "stored config is corrupt, using memory");
                Ok(None)
            }
        }
    }

    /// Value for `key`: written this session, then stored, then defaults.
    pub fn get(&self, key: &str) -> Option<Value> {
        if let Some(value) = lock(&self.state.written).get(key) {
            return Some(value.clone());
        }
        if let Some(store) = self.state.services.store.as_deref() {
            match self.load_stored(store) {
                Ok(Some(mut stored)) => {
                    if let Some(value) = stored.remove(key) {
                        return Some(value);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    debug!(plugin_id = %self.state.plugin_id, error = %e, "config store unavailable, using memory");
                }
            }
        }
        lock(&self.state.config).get(key).cloned()
    }

    /// Typed variant of [`get`](Self::get); `None` on absence or type mismatch.
    pub fn get_as<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| serde_json::from_value(v).ok())
    }

    /// Sets `key` in memory and attempts to persist it. Persistence failures
    /// are logged only.
    pub fn set(&self, key: &str, value: Value) {
        lock(&self.state.written).insert(key.to_string(), value.clone());

        let Some(store) = self.state.services.store.as_deref() else {
            return;
        };
        // Merging into an unreadable map would drop the other stored keys.
        let mut stored = match self.load_stored(store) {
            Ok(stored) => stored.unwrap_or_default(),
            Err(e) => {
                warn!(plugin_id = %self.state.plugin_id, key, error = %e, "config store unreadable, not persisting");
                return;
            }
        };
        stored.insert(key.to_string(), value);

        let result = serde_json::to_string(&stored)
            .map_err(|e| TesseraError::Storage { source: Box::new(e) })
            .and_then(|encoded| store.set_item(&self.storage_key(), &encoded));
        if let Err(e) = result {
            warn!(plugin_id = %self.state.plugin_id, key, error = %e, "failed to persist plugin config");
        }
    }
}

/// Runtime UI registrations and user feedback.
pub struct UiApi<'a> {
    state: &'a ApiState,
}

impl UiApi<'_> {
    /// Registers a component at runtime, replacing one with the same id.
    pub fn register_component(&self, component: Component) {
        let mut components = lock(&self.state.components);
        components.retain(|c| c.id != component.id);
        debug!(plugin_id = %self.state.plugin_id, component_id = %component.id, "component registered");
        components.push(component);
    }

    /// Returns whether a component with `id` was registered.
    pub fn unregister_component(&self, id: &str) -> bool {
        let mut components = lock(&self.state.components);
        let before = components.len();
        components.retain(|c| c.id != id);
        before != components.len()
    }

    pub fn registered_components(&self) -> Vec<Component> {
        lock(&self.state.components).clone()
    }

    /// Opens a modal and returns its opaque id.
    pub fn show_modal(&self, title: impl Into<String>, content: impl Renderable + 'static) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        lock(&self.state.modals).push(Modal {
            id: id.clone(),
            title: title.into(),
            content: Arc::new(content),
        });
        id
    }

    pub fn close_modal(&self, id: &str) -> bool {
        let mut modals = lock(&self.state.modals);
        let before = modals.len();
        modals.retain(|m| m.id != id);
        before != modals.len()
    }

    pub fn open_modals(&self) -> Vec<Modal> {
        lock(&self.state.modals).clone()
    }

    /// Shows a notification through the host dispatcher, or logs it at a
    /// level matching `kind` when there is none.
    pub fn show_notification(&self, message: &str, kind: NotificationKind) {
        let plugin_id = &self.state.plugin_id;
        if let Some(notifier) = &self.state.services.notifier {
            notifier.enqueue(
                message,
                &NotificationOptions {
                    kind,
                    plugin_id: plugin_id.clone(),
                },
            );
            return;
        }
        match kind {
            NotificationKind::Success => info!(plugin_id = %plugin_id, "[success] {message}"),
            NotificationKind::Error => error!(plugin_id = %plugin_id, "[error] {message}"),
            NotificationKind::Warning => warn!(plugin_id = %plugin_id, "[warning] {message}"),
            NotificationKind::Info => info!(plugin_id = %plugin_id, "[info] {message}"),
        }
    }
}

/// Runtime routes and navigation.
pub struct RoutingApi<'a> {
    state: &'a ApiState,
}

impl RoutingApi<'_> {
    /// Registers a route at runtime, replacing one with the same path.
    pub fn register_route(&self, route: Route) {
        let mut routes = lock(&self.state.routes);
        routes.retain(|r| r.path != route.path);
        debug!(plugin_id = %self.state.plugin_id, path = %route.path, "route registered");
        routes.push(route);
    }

    pub fn unregister_route(&self, path: &str) -> bool {
        let mut routes = lock(&self.state.routes);
        let before = routes.len();
        routes.retain(|r| r.path != path);
        before != routes.len()
    }

    pub fn registered_routes(&self) -> Vec<Route> {
        lock(&self.state.routes).clone()
    }

    pub fn navigate(&self, path: &str, options: NavigateOptions) {
        match &self.state.services.navigator {
            Some(navigator) => navigator.navigate(path, &options),
            None => info!(plugin_id = %self.state.plugin_id, path, "navigation requested"),
        }
    }
}

/// Calls through the host data client.
pub struct DataApi<'a> {
    state: &'a ApiState,
}

impl DataApi<'_> {
    pub async fn get(&self, endpoint: &str) -> Result<Value, TesseraError> {
        self.call(Method::Get, endpoint, None).await
    }

    pub async fn post(&self, endpoint: &str, payload: Value) -> Result<Value, TesseraError> {
        self.call(Method::Post, endpoint, Some(payload)).await
    }

    pub async fn put(&self, endpoint: &str, payload: Value) -> Result<Value, TesseraError> {
        self.call(Method::Put, endpoint, Some(payload)).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<Value, TesseraError> {
        self.call(Method::Delete, endpoint, None).await
    }

    async fn call(
        &self,
        method: Method,
        endpoint: &str,
        payload: Option<Value>,
    ) -> Result<Value, TesseraError> {
        match &self.state.services.client {
            Some(client) if client.supports(method) => {
                client.request(method, endpoint, payload).await
            }
            _ => {
                warn!(
                    plugin_id = %self.state.plugin_id,
                    %method,
                    endpoint,
                    "API client not available"
                );
                Err(TesseraError::ApiUnavailable)
            }
        }
    }
}
