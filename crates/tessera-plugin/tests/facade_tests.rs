// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the capability facade and host service wiring.

use std::sync::Arc;

use serde_json::json;
use tessera_core::{NotificationKind, TesseraError};
use tessera_plugin::{
    CoreServices, JsonFileStore, Lifecycle, Method, NavigateOptions, PluginApi, PluginDescriptor,
    PluginRegistry,
};
use tessera_test_utils::{MockDataClient, RecordingNavigator, RecordingNotifier};

#[tokio::test]
async fn data_calls_delegate_to_host_client() {
    let client = Arc::new(MockDataClient::with_responses(vec![json!([{"id": "e-1"}])]));
    let api = PluginApi::new(
        "entries",
        CoreServices {
            client: Some(client.clone()),
            ..CoreServices::default()
        },
    );

    let entries = api.data().get("/entries").await.unwrap();
    assert_eq!(entries, json!([{"id": "e-1"}]));
    api.data().put("/entries/e-1", json!({"title": "Renamed"})).await.unwrap();

    let requests = client.requests().await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].method, Method::Put);
    assert_eq!(requests[1].payload, Some(json!({"title": "Renamed"})));
}

#[tokio::test]
#[tracing_test::traced_test]
async fn missing_verb_is_unavailable_and_logged() {
    let client = Arc::new(MockDataClient::new().without(Method::Delete));
    let api = PluginApi::new(
        "entries",
        CoreServices {
            client: Some(client.clone()),
            ..CoreServices::default()
        },
    );

    let err = api.data().delete("/entries/e-1").await.unwrap_err();
    assert!(matches!(err, TesseraError::ApiUnavailable));
    assert_eq!(err.to_string(), "API client not available");
    assert!(client.requests().await.is_empty());
    assert!(logs_contain("API client not available"));
}

#[test]
fn navigation_goes_through_host_navigator() {
    let navigator = Arc::new(RecordingNavigator::new());
    let api = PluginApi::new(
        "roles",
        CoreServices {
            navigator: Some(navigator.clone()),
            ..CoreServices::default()
        },
    );
    api.routing().navigate(
        "/roles/inspect",
        NavigateOptions {
            replace: true,
            state: Some(json!({"from": "sidebar"})),
        },
    );

    let calls = navigator.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "/roles/inspect");
    assert!(calls[0].1.replace);
}

#[test]
#[tracing_test::traced_test]
fn navigation_without_navigator_is_logged() {
    let api = PluginApi::new("roles", CoreServices::default());
    api.routing().navigate("/roles", NavigateOptions::default());
    assert!(logs_contain("navigation requested"));
    assert!(logs_contain("/roles"));
}

#[test]
fn notifications_carry_kind_and_plugin() {
    let notifier = Arc::new(RecordingNotifier::new());
    let api = PluginApi::new(
        "acl-audit",
        CoreServices {
            notifier: Some(notifier.clone()),
            ..CoreServices::default()
        },
    );
    api.ui().show_notification("Export finished", NotificationKind::Success);

    let sent = notifier.notifications();
    assert_eq!(sent[0].0, "Export finished");
    assert_eq!(sent[0].1.kind, NotificationKind::Success);
    assert_eq!(sent[0].1.plugin_id, "acl-audit");
}

#[test]
#[tracing_test::traced_test]
fn notifications_without_notifier_are_logged() {
    let api = PluginApi::new("acl-audit", CoreServices::default());
    api.ui().show_notification("Retention too short", NotificationKind::Warning);
    assert!(logs_contain("[warning] Retention too short"));
}

#[tokio::test]
async fn stored_config_wins_over_defaults_across_restarts() {
    let tmp = tempfile::tempdir().unwrap();
    let store_path = tmp.path().join("store.json");

    let descriptor = || {
        PluginDescriptor::new("acl-audit", "ACL audit", "1.0.0")
            .with_config("retention_days", json!(30))
            .with_lifecycle(Lifecycle::default().on_initialize(|api| async move {
                if api.config().get("retention_days") == Some(json!(30)) {
                    api.config().set("retention_days", json!(90));
                }
                Ok(())
            }))
    };

    let services = || CoreServices {
        store: Some(Arc::new(JsonFileStore::new(&store_path))),
        ..CoreServices::default()
    };

    let mut first = PluginRegistry::with_services(services());
    first.register_plugin(descriptor()).unwrap();
    first.initialize_plugins().await;

    let mut second = PluginRegistry::with_services(services());
    second.register_plugin(descriptor()).unwrap();
    second.initialize_plugins().await;

    let api = second.api("acl-audit").unwrap();
    assert_eq!(api.config().get("retention_days"), Some(json!(90)));
}

#[tokio::test]
async fn custom_api_factory_is_used() {
    let notifier = Arc::new(RecordingNotifier::new());
    let factory_notifier = notifier.clone();
    let mut registry = PluginRegistry::new();
    registry.set_api_factory(move |plugin| {
        PluginApi::new(
            plugin.id().as_str(),
            CoreServices {
                notifier: Some(factory_notifier.clone()),
                ..CoreServices::default()
            },
        )
    });
    registry
        .register_plugin(
            PluginDescriptor::new("hello", "Hello", "1.0.0").with_lifecycle(
                Lifecycle::default().on_initialize(|api| async move {
                    api.ui().show_notification("hi", NotificationKind::Info);
                    Ok(())
                }),
            ),
        )
        .unwrap();

    registry.initialize_plugins().await;
    assert_eq!(notifier.notifications().len(), 1);
}
