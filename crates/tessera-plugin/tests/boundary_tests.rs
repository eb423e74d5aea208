// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the fault isolation boundary.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tessera_core::TesseraError;
use tessera_plugin::{
    BoundaryState, FaultBoundary, Markup, Plugin, PluginDescriptor, Renderable,
};
use tessera_test_utils::{ErrorEvent, RecordingErrorHandler};

/// Fails until `healthy` is set.
struct FlakyView {
    healthy: Arc<AtomicBool>,
}

impl Renderable for FlakyView {
    fn render(&self) -> Result<Markup, TesseraError> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(Markup::new("<p>entries</p>"))
        } else {
            Err(TesseraError::Render("entry list unavailable".into()))
        }
    }
}

fn audit_plugin() -> Arc<Plugin> {
    Arc::new(
        Plugin::try_from_descriptor(PluginDescriptor::new("acl-audit", "ACL audit", "0.3.0"))
            .unwrap(),
    )
}

#[test]
fn fault_renders_panel_and_reports_to_handler() {
    let handler = RecordingErrorHandler::new();
    let healthy = Arc::new(AtomicBool::new(false));
    let mut boundary = FaultBoundary::new(Arc::new(FlakyView {
        healthy: healthy.clone(),
    }))
    .for_plugin(audit_plugin())
    .with_handler(Arc::new(handler.clone()));

    let panel = boundary.render();
    assert_eq!(boundary.state(), BoundaryState::Faulted);
    assert!(panel.as_str().contains("data-plugin=\"acl-audit\""));
    assert!(panel.as_str().contains("ACL audit v0.3.0"));
    assert!(panel.as_str().contains("data-action=\"retry\""));
    assert!(!panel.as_str().contains("entry list unavailable"));

    let events = handler.events();
    assert_eq!(events.len(), 1);
    match &events[0] {
        ErrorEvent::Runtime { plugin_id, message, context } => {
            assert_eq!(plugin_id, "acl-audit");
            assert!(message.contains("entry list unavailable"));
            assert_eq!(context["boundary"], "render");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn retry_after_fault_cleared_renders_content() {
    let healthy = Arc::new(AtomicBool::new(false));
    let mut boundary = FaultBoundary::new(Arc::new(FlakyView {
        healthy: healthy.clone(),
    }))
    .for_plugin(audit_plugin());

    boundary.render();
    assert_eq!(boundary.state(), BoundaryState::Faulted);

    healthy.store(true, Ordering::SeqCst);
    assert!(boundary.render().as_str().contains("tessera-fault"));

    let output = boundary.retry();
    assert_eq!(output.as_str(), "<p>entries</p>");
    assert_eq!(boundary.state(), BoundaryState::Normal);
    assert!(boundary.fault().is_none());
}

#[test]
fn panics_without_plugin_identity_skip_handler() {
    let handler = RecordingErrorHandler::new();
    let mut boundary = FaultBoundary::new(Arc::new(tessera_plugin::renderer(|| {
        panic!("index out of range")
    })))
    .with_handler(Arc::new(handler.clone()))
    .with_details(true);

    let panel = boundary.render();
    assert!(panel.as_str().contains("Unknown plugin"));
    assert!(panel.as_str().contains("index out of range"));
    assert!(handler.is_empty());
}
