// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only views over an initialized registry, used by the subcommands.
//!
//! Every view is returned as a `String` so the caller decides where it goes.

use std::sync::Arc;

use colored::Colorize;
use tessera_core::{ComponentLocation, TesseraError};
use tessera_plugin::{
    FaultBoundary, GuardOutcome, LoggingErrorHandler, Plugin, PluginRegistry, PluginStatus, Route,
};

/// One line per registered plugin: id, version, status, priority, name.
pub fn plugins_table(registry: &PluginRegistry, use_color: bool) -> String {
    let mut out = String::new();
    for plugin in registry.all_plugins() {
        let status = registry
            .status(plugin.id().as_str())
            .unwrap_or(PluginStatus::Enabled);
        let label = format!("{:<11}", status.to_string());
        let label = match (use_color, status) {
            (false, _) => label,
            (true, PluginStatus::Initialized) => label.green().to_string(),
            (true, PluginStatus::Enabled) => label.yellow().to_string(),
            (true, PluginStatus::Disabled) => label.red().to_string(),
        };
        out.push_str(&format!(
            "  {:<20} {:<10} {label} {:>5}  {}\n",
            plugin.id().as_str(),
            plugin.version().to_string(),
            registry.effective_priority(plugin),
            plugin.name(),
        ));
    }
    if out.is_empty() {
        out.push_str("  no plugins registered\n");
    }
    out
}

/// Routes in aggregation order, followed by runtime-registered routes.
pub fn routes_table(registry: &PluginRegistry) -> String {
    let mut out = String::new();
    for route in registry.routes() {
        out.push_str(&route_line(route.plugin.id().as_str(), route.item, ""));
    }
    for plugin in registry.enabled_plugins() {
        if let Some(api) = registry.api(plugin.id().as_str()) {
            for route in api.routing().registered_routes() {
                out.push_str(&route_line(plugin.id().as_str(), &route, " (runtime)"));
            }
        }
    }
    if out.is_empty() {
        out.push_str("  no routes\n");
    }
    out
}

fn route_line(plugin_id: &str, route: &Route, suffix: &str) -> String {
    let guard = match route.check_guards() {
        GuardOutcome::Allow => String::new(),
        GuardOutcome::Redirect(to) => format!(" -> {to}"),
    };
    let native = if route.overrides_native { " [override]" } else { "" };
    format!(
        "  {:<28} {:<20} {:>5} {:<8}{native}{guard}{suffix}\n",
        route.path,
        plugin_id,
        route.effective_priority(),
        route.layout.to_string(),
    )
}

/// Components in mount order, optionally for a single location.
pub fn components_table(registry: &PluginRegistry, location: Option<ComponentLocation>) -> String {
    let mut out = String::new();
    for component in registry.components(location) {
        let state = if component.item.is_active() { "active" } else { "inactive" };
        out.push_str(&format!(
            "  {:<20} {:<20} {:<8} {:>5}  {:<6} {state}\n",
            component.item.id,
            component.plugin.id().as_str(),
            component.item.position.location.to_string(),
            component.item.effective_order(),
            component.item.trigger.kind.to_string(),
        ));
    }
    if out.is_empty() {
        out.push_str("  no components\n");
    }
    out
}

/// Registry statistics as text or JSON.
pub fn stats_report(registry: &PluginRegistry, json: bool) -> Result<String, TesseraError> {
    let stats = registry.statistics();
    if json {
        return serde_json::to_string_pretty(&stats)
            .map_err(|e| TesseraError::Internal(format!("failed to encode statistics: {e}")));
    }
    Ok(format!(
        "  total        {}\n  enabled      {}\n  initialized  {}\n  disabled     {}\n",
        stats.total, stats.enabled, stats.initialized, stats.disabled
    ))
}

/// Render the route mounted at `path` inside a fault boundary.
///
/// Guards are honoured: a failing guard yields a redirect notice instead of
/// content.
pub fn render_route(registry: &PluginRegistry, path: &str, details: bool) -> Result<String, TesseraError> {
    let (plugin, route) = find_route(registry, path)
        .ok_or_else(|| TesseraError::Internal(format!("no route mounted at `{path}`")))?;

    if let GuardOutcome::Redirect(to) = route.check_guards() {
        return Ok(format!("redirect: {to}\n"));
    }

    let mut boundary = FaultBoundary::new(route.renderable)
        .for_plugin(plugin)
        .with_handler(Arc::new(LoggingErrorHandler))
        .with_details(details);
    if details {
        boundary.toggle_details();
    }
    Ok(format!("{}\n", boundary.render()))
}

fn find_route(registry: &PluginRegistry, path: &str) -> Option<(Arc<Plugin>, Route)> {
    if let Some(found) = registry.routes().into_iter().find(|r| r.item.path == path) {
        return Some((Arc::clone(found.plugin), found.item.clone()));
    }
    registry.enabled_plugins().into_iter().find_map(|plugin| {
        let api = registry.api(plugin.id().as_str())?;
        api.routing()
            .registered_routes()
            .into_iter()
            .find(|r| r.path == path)
            .map(|route| (Arc::clone(plugin), route))
    })
}
