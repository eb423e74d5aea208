// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording implementations of host-side traits.
//!
//! Everything here is synchronous: the traits they implement are called from
//! non-async contexts, so a std `Mutex` is used throughout.

use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tessera_core::{PluginError, PluginErrorKind};
use tessera_plugin::{
    NavigateOptions, Navigator, NotificationOptions, Notifier, Plugin, PluginDescriptor,
    PluginErrorHandler,
};

/// Ordered log shared between test hooks.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl Into<String>) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Position of the first event equal to `event`.
    pub fn position(&self, event: &str) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }

    pub fn count(&self, event: &str) -> usize {
        self.events().iter().filter(|e| *e == event).count()
    }
}

/// A captured error handler call.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorEvent {
    Load { plugin_id: String, kind: PluginErrorKind, message: String },
    Init { plugin_id: String, message: String, cause: Option<String> },
    Runtime { plugin_id: String, message: String, context: Value },
    Dependency { plugin_id: String, missing: Vec<String> },
}

impl ErrorEvent {
    pub fn plugin_id(&self) -> &str {
        match self {
            Self::Load { plugin_id, .. }
            | Self::Init { plugin_id, .. }
            | Self::Runtime { plugin_id, .. }
            | Self::Dependency { plugin_id, .. } => plugin_id,
        }
    }
}

/// Error handler that records every call for later assertion.
#[derive(Debug, Clone, Default)]
pub struct RecordingErrorHandler {
    events: Arc<Mutex<Vec<ErrorEvent>>>,
}

impl RecordingErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ErrorEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events().is_empty()
    }

    fn record(&self, event: ErrorEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl PluginErrorHandler for RecordingErrorHandler {
    fn on_load_error(&self, descriptor: &PluginDescriptor, error: &PluginError) {
        self.record(ErrorEvent::Load {
            plugin_id: descriptor.id.clone(),
            kind: error.kind,
            message: error.message.clone(),
        });
    }

    fn on_init_error(&self, plugin: &Plugin, error: &PluginError) {
        self.record(ErrorEvent::Init {
            plugin_id: plugin.id().to_string(),
            message: error.message.clone(),
            cause: error.cause.clone(),
        });
    }

    fn on_runtime_error(&self, plugin: &Plugin, error: &PluginError, context: &Value) {
        self.record(ErrorEvent::Runtime {
            plugin_id: plugin.id().to_string(),
            message: error.message.clone(),
            context: context.clone(),
        });
    }

    fn on_dependency_error(&self, plugin: &Plugin, missing: &[String]) {
        self.record(ErrorEvent::Dependency {
            plugin_id: plugin.id().to_string(),
            missing: missing.to_vec(),
        });
    }
}

/// Navigator capturing requested paths.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    calls: Arc<Mutex<Vec<(String, NavigateOptions)>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(String, NavigateOptions)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str, options: &NavigateOptions) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((path.to_string(), options.clone()));
    }
}

/// Notifier capturing enqueued notifications.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notifications: Arc<Mutex<Vec<(String, NotificationOptions)>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<(String, NotificationOptions)> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn enqueue(&self, message: &str, options: &NotificationOptions) {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((message.to_string(), options.clone()));
    }
}
