// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in extension catalog.
//!
//! Returns descriptors for the extensions compiled into the catalog admin
//! host. No filesystem access is involved.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::json;
use tessera_core::{ComponentLocation, NotificationKind, TriggerKind};
use tracing::debug;

use crate::descriptor::{
    Component, Lifecycle, Markup, PluginDescriptor, Route, RouteGuard, Trigger, renderer,
};

/// Default audit log retention when neither host nor store sets one.
pub const DEFAULT_RETENTION_DAYS: u64 = 30;

/// Returns descriptors for all built-in extensions.
///
/// - acl-audit: access-control audit page and header badge
/// - role-inspector: role browser, requires acl-audit
pub fn builtin_catalog() -> Vec<PluginDescriptor> {
    vec![acl_audit(), role_inspector()]
}

fn acl_audit() -> PluginDescriptor {
    PluginDescriptor::new("acl-audit", "ACL audit", "0.3.0")
        .with_description("Audit trail of access-control changes to catalog entries")
        .with_priority(100)
        .with_config("retention_days", json!(DEFAULT_RETENTION_DAYS))
        .with_route(Route::new(
            "/acl/audit",
            Markup::new(
                "<h2>Access control audit</h2>\
                 <table class=\"acl-audit\"><thead><tr><th>When</th><th>Entry</th><th>Change</th></tr></thead></table>",
            ),
        ))
        .with_component(
            Component::new(
                "audit-badge",
                Markup::new("<span class=\"badge\">audit</span>"),
                ComponentLocation::Header,
            )
            .with_order(10)
            .with_trigger(Trigger::new(TriggerKind::Button).with_target("/acl/audit")),
        )
        .with_lifecycle(Lifecycle::default().on_initialize(|api| async move {
            let days = api
                .config()
                .get_as::<u64>("retention_days")
                .unwrap_or(DEFAULT_RETENTION_DAYS);
            api.routing().register_route(Route::new(
                "/acl/audit/retention",
                Markup::new(format!("<p>Audit entries are kept for {days} days.</p>")),
            ));
            debug!(plugin_id = api.plugin_id(), retention_days = days, "audit retention configured");
            Ok(())
        }))
}

fn role_inspector() -> PluginDescriptor {
    let ready = Arc::new(AtomicBool::new(false));
    let guard_ready = Arc::clone(&ready);
    let init_ready = Arc::clone(&ready);
    let deactivate_ready = Arc::clone(&ready);

    PluginDescriptor::new("role-inspector", "Role inspector", "0.2.0")
        .with_description("Browse roles and the catalog permissions they grant")
        .with_priority(200)
        .with_dependency("acl-audit")
        .with_route(
            Route::new(
                "/roles/inspect",
                renderer(|| Ok(Markup::new("<h2>Roles</h2><ul class=\"roles\"></ul>"))),
            )
            .with_guard(RouteGuard::new(
                move || guard_ready.load(Ordering::SeqCst),
                "/acl/audit",
            )),
        )
        .with_component(
            Component::new(
                "role-list",
                Markup::new("<nav class=\"roles\">Roles</nav>"),
                ComponentLocation::Sidebar,
            )
            .with_order(20)
            .with_trigger(Trigger::new(TriggerKind::Menu).with_target("/roles/inspect")),
        )
        .with_lifecycle(
            Lifecycle::default()
                .on_initialize(move |api| {
                    let ready = Arc::clone(&init_ready);
                    async move {
                        ready.store(true, Ordering::SeqCst);
                        api.ui()
                            .show_notification("Role inspector ready", NotificationKind::Info);
                        Ok(())
                    }
                })
                .on_deactivate(move || {
                    let ready = Arc::clone(&deactivate_ready);
                    async move {
                        ready.store(false, Ordering::SeqCst);
                        Ok(())
                    }
                }),
        )
}
