// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host-supplied receiver of contained plugin failures.

use serde_json::Value;
use tessera_core::PluginError;
use tracing::{error, warn};

use crate::descriptor::{Plugin, PluginDescriptor};

/// Observer for plugin errors the runtime contains instead of propagating.
///
/// All methods default to doing nothing so hosts only override what they
/// care about.
pub trait PluginErrorHandler: Send + Sync {
    /// A descriptor was rejected by `register_plugin`.
    fn on_load_error(&self, _descriptor: &PluginDescriptor, _error: &PluginError) {}

    /// An `initialize` or `activate` hook failed or timed out.
    fn on_init_error(&self, _plugin: &Plugin, _error: &PluginError) {}

    /// A failure after initialization: deactivate errors, render faults.
    fn on_runtime_error(&self, _plugin: &Plugin, _error: &PluginError, _context: &Value) {}

    /// Declared dependencies were not available at initialization time.
    fn on_dependency_error(&self, _plugin: &Plugin, _missing: &[String]) {}
}

/// Default handler: every event becomes a structured log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingErrorHandler;

impl PluginErrorHandler for LoggingErrorHandler {
    fn on_load_error(&self, descriptor: &PluginDescriptor, err: &PluginError) {
        error!(plugin_id = %descriptor.id, error = %err, "failed to load plugin");
    }

    fn on_init_error(&self, plugin: &Plugin, err: &PluginError) {
        error!(plugin_id = %plugin.id(), error = %err, "failed to initialize plugin");
    }

    fn on_runtime_error(&self, plugin: &Plugin, err: &PluginError, context: &Value) {
        error!(plugin_id = %plugin.id(), error = %err, %context, "plugin runtime error");
    }

    fn on_dependency_error(&self, plugin: &Plugin, missing: &[String]) {
        warn!(
            plugin_id = %plugin.id(),
            missing = ?missing,
            "plugin has missing dependencies"
        );
    }
}
