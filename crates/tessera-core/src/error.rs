// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Tessera plugin runtime.

use thiserror::Error;

use crate::types::PluginErrorKind;

/// The primary error type used across the runtime crates.
#[derive(Debug, Error)]
pub enum TesseraError {
    /// Configuration errors (invalid TOML, bad values, unparsable requirements).
    #[error("configuration error: {0}")]
    Config(String),

    /// A plugin-scoped failure carrying its kind and owning plugin id.
    #[error(transparent)]
    Plugin(#[from] PluginError),

    /// Durable store errors (unreadable file, corrupt payload, failed write).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A capability facade data call was made without a usable client.
    #[error("API client not available")]
    ApiUnavailable,

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// A renderable failed to produce output.
    #[error("render error: {0}")]
    Render(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TesseraError {
    /// Returns the plugin error payload if this is a plugin-scoped error.
    pub fn as_plugin_error(&self) -> Option<&PluginError> {
        match self {
            TesseraError::Plugin(e) => Some(e),
            _ => None,
        }
    }
}

/// A failure attributed to a single plugin.
///
/// Created at the failure site and handed straight to the error handler;
/// never persisted.
#[derive(Debug, Clone, Error)]
#[error("plugin `{plugin_id}` {kind} error: {message}")]
pub struct PluginError {
    pub plugin_id: String,
    pub kind: PluginErrorKind,
    pub message: String,
    /// Rendered form of the underlying error, if any.
    pub cause: Option<String>,
    /// Extra structured context (e.g. `{"action": "disable"}`).
    pub context: Option<serde_json::Value>,
}

impl PluginError {
    pub fn new(plugin_id: impl Into<String>, kind: PluginErrorKind, message: impl Into<String>) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            kind,
            message: message.into(),
            cause: None,
            context: None,
        }
    }

    pub fn load(plugin_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(plugin_id, PluginErrorKind::Load, message)
    }

    pub fn init(plugin_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(plugin_id, PluginErrorKind::Init, message)
    }

    pub fn runtime(plugin_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(plugin_id, PluginErrorKind::Runtime, message)
    }

    pub fn dependency(plugin_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(plugin_id, PluginErrorKind::Dependency, message)
    }

    /// Attaches the display form of an underlying error.
    pub fn with_cause(mut self, cause: &dyn std::fmt::Display) -> Self {
        self.cause = Some(cause.to_string());
        self
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }
}
