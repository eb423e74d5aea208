// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin descriptor model.
//!
//! A [`PluginDescriptor`] is the raw, caller-supplied shape a loader or host
//! builds. The registry validates it exactly once into a [`Plugin`], the
//! closed record every other part of the runtime works with.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::{Map, Value};
use tessera_core::{
    ComponentLocation, DEFAULT_PRIORITY, Layout, PluginError, PluginId, TesseraError, TriggerKind,
};

use crate::api::PluginApi;

/// Displayable output produced by a renderable.
///
/// The runtime never looks inside; hosts decide how to paint it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Markup(String);

impl Markup {
    pub fn new(content: impl Into<String>) -> Self {
        Self(content.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Something that produces a displayable unit.
pub trait Renderable: Send + Sync {
    fn render(&self) -> Result<Markup, TesseraError>;
}

/// A fixed piece of markup renders as itself.
impl Renderable for Markup {
    fn render(&self) -> Result<Markup, TesseraError> {
        Ok(self.clone())
    }
}

/// Zero-argument factories are renderables.
impl<F> Renderable for F
where
    F: Fn() -> Result<Markup, TesseraError> + Send + Sync,
{
    fn render(&self) -> Result<Markup, TesseraError> {
        self()
    }
}

/// Pins a closure's signature so it can be passed where `impl Renderable` is expected.
pub fn renderer<F>(f: F) -> F
where
    F: Fn() -> Result<Markup, TesseraError> + Send + Sync + 'static,
{
    f
}

/// Shared handle to a renderable.
pub type SharedRenderable = Arc<dyn Renderable>;

/// A host view referenced by name, used by manifest-declared plugins.
#[derive(Debug, Clone)]
pub struct NamedView {
    name: String,
}

impl NamedView {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Renderable for NamedView {
    fn render(&self) -> Result<Markup, TesseraError> {
        Ok(Markup::new(format!(
            "<tessera-view name=\"{}\"></tessera-view>",
            self.name
        )))
    }
}

/// Predicate checked before a route may be entered, with the path to send
/// the user to when it fails.
#[derive(Clone)]
pub struct RouteGuard {
    check: Arc<dyn Fn() -> bool + Send + Sync>,
    fallback: String,
}

impl RouteGuard {
    pub fn new(check: impl Fn() -> bool + Send + Sync + 'static, fallback: impl Into<String>) -> Self {
        Self {
            check: Arc::new(check),
            fallback: fallback.into(),
        }
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn passes(&self) -> bool {
        (self.check)()
    }
}

impl fmt::Debug for RouteGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteGuard")
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

/// Result of evaluating a route's guards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    Redirect(String),
}

/// A navigable extension point.
#[derive(Clone)]
pub struct Route {
    pub path: String,
    pub renderable: SharedRenderable,
    pub priority: Option<i32>,
    /// Replace a host-native route mounted at the same path.
    pub overrides_native: bool,
    pub layout: Layout,
    pub guards: Vec<RouteGuard>,
}

impl Route {
    pub fn new(path: impl Into<String>, renderable: impl Renderable + 'static) -> Self {
        Self {
            path: path.into(),
            renderable: Arc::new(renderable),
            priority: None,
            overrides_native: false,
            layout: Layout::Default,
            guards: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn overriding_native(mut self) -> Self {
        self.overrides_native = true;
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_guard(mut self, guard: RouteGuard) -> Self {
        self.guards.push(guard);
        self
    }

    pub fn effective_priority(&self) -> i32 {
        self.priority.unwrap_or(DEFAULT_PRIORITY)
    }

    /// Evaluates guards in order; the first failing guard decides the redirect.
    pub fn check_guards(&self) -> GuardOutcome {
        self.guards
            .iter()
            .find(|guard| !guard.passes())
            .map(|guard| GuardOutcome::Redirect(guard.fallback.clone()))
            .unwrap_or(GuardOutcome::Allow)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("priority", &self.priority)
            .field("overrides_native", &self.overrides_native)
            .field("layout", &self.layout)
            .field("guards", &self.guards.len())
            .finish_non_exhaustive()
    }
}

/// How a component is brought on screen.
#[derive(Clone, Default)]
pub struct Trigger {
    pub kind: TriggerKind,
    pub target: Option<String>,
    pub condition: Option<Arc<dyn Fn() -> bool + Send + Sync>>,
}

impl Trigger {
    pub fn new(kind: TriggerKind) -> Self {
        Self {
            kind,
            target: None,
            condition: None,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_condition(mut self, condition: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.condition = Some(Arc::new(condition));
        self
    }
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trigger")
            .field("kind", &self.kind)
            .field("target", &self.target)
            .field("condition", &self.condition.is_some())
            .finish()
    }
}

/// Where a component is mounted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub location: ComponentLocation,
    pub order: Option<i32>,
}

/// A non-route UI extension fragment.
#[derive(Clone)]
pub struct Component {
    /// Unique within the owning plugin.
    pub id: String,
    pub renderable: SharedRenderable,
    pub trigger: Trigger,
    pub position: Position,
}

impl Component {
    pub fn new(
        id: impl Into<String>,
        renderable: impl Renderable + 'static,
        location: ComponentLocation,
    ) -> Self {
        Self {
            id: id.into(),
            renderable: Arc::new(renderable),
            trigger: Trigger::default(),
            position: Position {
                location,
                order: None,
            },
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.position.order = Some(order);
        self
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn effective_order(&self) -> i32 {
        self.position.order.unwrap_or(DEFAULT_PRIORITY)
    }

    /// False when the trigger carries a condition that currently fails.
    pub fn is_active(&self) -> bool {
        self.trigger.condition.as_ref().is_none_or(|condition| condition())
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.id)
            .field("trigger", &self.trigger)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

/// Future returned by lifecycle hooks.
pub type HookFuture = BoxFuture<'static, Result<(), TesseraError>>;

/// `initialize(capabilities)` hook.
pub type InitializeHook = Arc<dyn Fn(PluginApi) -> HookFuture + Send + Sync>;

/// `activate()` / `deactivate()` hook.
pub type LifecycleHook = Arc<dyn Fn() -> HookFuture + Send + Sync>;

/// Optional asynchronous lifecycle hooks of a plugin.
#[derive(Clone, Default)]
pub struct Lifecycle {
    pub initialize: Option<InitializeHook>,
    pub activate: Option<LifecycleHook>,
    pub deactivate: Option<LifecycleHook>,
}

impl Lifecycle {
    pub fn on_initialize<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(PluginApi) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TesseraError>> + Send + 'static,
    {
        self.initialize = Some(Arc::new(move |api| Box::pin(hook(api))));
        self
    }

    pub fn on_activate<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TesseraError>> + Send + 'static,
    {
        self.activate = Some(Arc::new(move || Box::pin(hook())));
        self
    }

    pub fn on_deactivate<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TesseraError>> + Send + 'static,
    {
        self.deactivate = Some(Arc::new(move || Box::pin(hook())));
        self
    }
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("initialize", &self.initialize.is_some())
            .field("activate", &self.activate.is_some())
            .field("deactivate", &self.deactivate.is_some())
            .finish()
    }
}

/// Unvalidated plugin description as produced by loaders or host code.
#[derive(Debug, Clone, Default)]
pub struct PluginDescriptor {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub dependencies: Vec<String>,
    /// Advisory only; never enforced.
    pub peer_dependencies: Vec<String>,
    pub lifecycle: Lifecycle,
    pub routes: Vec<Route>,
    pub components: Vec<Component>,
    pub config: Map<String, Value>,
    pub priority: Option<i32>,
}

impl PluginDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_dependency(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        if !self.dependencies.contains(&id) {
            self.dependencies.push(id);
        }
        self
    }

    pub fn with_peer_dependency(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        if !self.peer_dependencies.contains(&id) {
            self.peer_dependencies.push(id);
        }
        self
    }

    pub fn with_lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    pub fn with_route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_config(mut self, key: impl Into<String>, value: Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Structural validation; the first failing check wins.
    pub fn validate(&self) -> Result<(PluginId, semver::Version), PluginError> {
        let id = PluginId::parse(&self.id).map_err(|e| PluginError::load(&self.id, e.to_string()))?;

        if self.name.trim().is_empty() {
            return Err(PluginError::load(&self.id, "plugin name must not be empty"));
        }

        if self.version.trim().is_empty() {
            return Err(PluginError::load(&self.id, "plugin version must not be empty"));
        }

        let version = semver::Version::parse(&self.version).map_err(|e| {
            PluginError::load(
                &self.id,
                format!("plugin version `{}` is not valid semver: {e}", self.version),
            )
        })?;

        Ok((id, version))
    }
}

/// A validated plugin, owned by the registry once registered.
#[derive(Debug)]
pub struct Plugin {
    id: PluginId,
    name: String,
    version: semver::Version,
    description: Option<String>,
    dependencies: Vec<String>,
    peer_dependencies: Vec<String>,
    lifecycle: Lifecycle,
    routes: Vec<Route>,
    components: Vec<Component>,
    config: Map<String, Value>,
    priority: Option<i32>,
}

impl Plugin {
    /// Validates a descriptor into a plugin.
    pub fn try_from_descriptor(descriptor: PluginDescriptor) -> Result<Self, PluginError> {
        let (id, version) = descriptor.validate()?;
        Ok(Self::from_validated(id, version, descriptor))
    }

    pub(crate) fn from_validated(
        id: PluginId,
        version: semver::Version,
        descriptor: PluginDescriptor,
    ) -> Self {
        Self {
            id,
            name: descriptor.name,
            version,
            description: descriptor.description,
            dependencies: descriptor.dependencies,
            peer_dependencies: descriptor.peer_dependencies,
            lifecycle: descriptor.lifecycle,
            routes: descriptor.routes,
            components: descriptor.components,
            config: descriptor.config,
            priority: descriptor.priority,
        }
    }

    pub fn id(&self) -> &PluginId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &semver::Version {
        &self.version
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn peer_dependencies(&self) -> &[String] {
        &self.peer_dependencies
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn config(&self) -> &Map<String, Value> {
        &self.config
    }

    /// Declared priority, if any.
    pub fn declared_priority(&self) -> Option<i32> {
        self.priority
    }

    pub fn priority(&self) -> i32 {
        self.priority.unwrap_or(DEFAULT_PRIORITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn validate_accepts_full_semver() {
        let descriptor = PluginDescriptor::new("acl-audit", "ACL audit", "1.2.3-beta.1+build.7");
        let (id, version) = descriptor.validate().unwrap();
        assert_eq!(id.as_str(), "acl-audit");
        assert_eq!(version.pre.as_str(), "beta.1");
        assert_eq!(version.build.as_str(), "build.7");
    }

    #[test]
    fn validate_first_failure_wins() {
        let err = PluginDescriptor::new("bad id", "", "nope").validate().unwrap_err();
        assert!(err.message.contains("may only contain"), "{err}");

        let err = PluginDescriptor::new("ok", " ", "nope").validate().unwrap_err();
        assert!(err.message.contains("name must not be empty"));

        let err = PluginDescriptor::new("ok", "Ok", "").validate().unwrap_err();
        assert!(err.message.contains("version must not be empty"));

        let err = PluginDescriptor::new("ok", "Ok", "1.2").validate().unwrap_err();
        assert!(err.message.contains("not valid semver"));
        assert_eq!(err.kind, tessera_core::PluginErrorKind::Load);
    }

    #[test]
    fn try_from_descriptor_keeps_contributions() {
        let plugin = Plugin::try_from_descriptor(
            PluginDescriptor::new("roles", "Roles", "0.1.0")
                .with_dependency("acl-audit")
                .with_dependency("acl-audit")
                .with_route(Route::new("/roles", Markup::new("roles")))
                .with_config("page_size", serde_json::json!(25)),
        )
        .unwrap();
        assert_eq!(plugin.dependencies(), ["acl-audit"]);
        assert_eq!(plugin.routes().len(), 1);
        assert_eq!(plugin.priority(), DEFAULT_PRIORITY);
        assert_eq!(plugin.config()["page_size"], 25);
    }

    #[test]
    fn guards_redirect_to_first_failing_fallback() {
        let route = Route::new("/acl", Markup::new("acl"))
            .with_guard(RouteGuard::new(|| true, "/never"))
            .with_guard(RouteGuard::new(|| false, "/login"))
            .with_guard(RouteGuard::new(|| false, "/other"));
        assert_eq!(route.check_guards(), GuardOutcome::Redirect("/login".to_string()));

        let open = Route::new("/open", Markup::new("open"));
        assert_eq!(open.check_guards(), GuardOutcome::Allow);
    }

    #[test]
    fn component_condition_controls_activity() {
        let flag = Arc::new(AtomicBool::new(false));
        let seen = flag.clone();
        let component = Component::new("badge", Markup::new("!"), ComponentLocation::Header)
            .with_trigger(
                Trigger::new(TriggerKind::Button).with_condition(move || seen.load(Ordering::SeqCst)),
            );
        assert!(!component.is_active());
        flag.store(true, Ordering::SeqCst);
        assert!(component.is_active());
        assert_eq!(component.effective_order(), DEFAULT_PRIORITY);
    }

    #[test]
    fn closures_and_named_views_render() {
        let route = Route::new("/x", renderer(|| Ok(Markup::new("from closure"))));
        assert_eq!(route.renderable.render().unwrap().as_str(), "from closure");

        let view = NamedView::new("entry-export");
        assert_eq!(
            view.render().unwrap().as_str(),
            "<tessera-view name=\"entry-export\"></tessera-view>"
        );
    }
}
