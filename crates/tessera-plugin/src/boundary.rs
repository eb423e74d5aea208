// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fault isolation boundary around plugin renderables.
//!
//! A [`FaultBoundary`] wraps one renderable. Render errors and panics inside
//! it are captured, reported and replaced by a diagnostic panel (or a caller
//! fallback) so the rest of the host keeps rendering. The boundary stays
//! faulted until [`FaultBoundary::retry`] is called.

use std::backtrace::Backtrace;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use serde_json::json;
use tessera_core::{PluginError, TesseraError};
use tracing::error;

use crate::descriptor::{Markup, Plugin, SharedRenderable};
use crate::handler::PluginErrorHandler;

/// Whether the boundary currently shows content or a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum BoundaryState {
    Normal,
    Faulted,
}

/// How the wrapped renderable failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum FaultKind {
    Error,
    Panic,
}

/// A captured render failure.
#[derive(Debug, Clone)]
pub struct Fault {
    pub kind: FaultKind,
    pub message: String,
    pub trace: String,
}

impl Fault {
    fn from_error(err: &TesseraError) -> Self {
        Self {
            kind: FaultKind::Error,
            message: err.to_string(),
            trace: Backtrace::capture().to_string(),
        }
    }

    fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        Self {
            kind: FaultKind::Panic,
            message: panic_message(payload),
            trace: Backtrace::capture().to_string(),
        }
    }
}

/// Extract a human-readable message from a panic payload.
pub fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        return (*msg).to_string();
    }
    if let Some(msg) = payload.downcast_ref::<String>() {
        return msg.clone();
    }
    "non-string panic payload".to_string()
}

/// Custom faulted output; replaces the default panel.
pub type FaultFallback = Arc<dyn Fn(&Fault) -> Markup + Send + Sync>;

/// Error boundary for a single renderable.
pub struct FaultBoundary {
    content: SharedRenderable,
    plugin: Option<Arc<Plugin>>,
    handler: Option<Arc<dyn PluginErrorHandler>>,
    fallback: Option<FaultFallback>,
    details_enabled: bool,
    details_open: bool,
    fault: Option<Fault>,
}

impl FaultBoundary {
    pub fn new(content: SharedRenderable) -> Self {
        Self {
            content,
            plugin: None,
            handler: None,
            fallback: None,
            details_enabled: false,
            details_open: false,
            fault: None,
        }
    }

    /// Attributes faults to `plugin` in logs, reports and the panel.
    pub fn for_plugin(mut self, plugin: Arc<Plugin>) -> Self {
        self.plugin = Some(plugin);
        self
    }

    pub fn with_handler(mut self, handler: Arc<dyn PluginErrorHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Allow the default panel to show the fault message and trace.
    pub fn with_details(mut self, enabled: bool) -> Self {
        self.details_enabled = enabled;
        self
    }

    pub fn with_fallback(mut self, fallback: impl Fn(&Fault) -> Markup + Send + Sync + 'static) -> Self {
        self.fallback = Some(Arc::new(fallback));
        self
    }

    pub fn state(&self) -> BoundaryState {
        if self.fault.is_some() {
            BoundaryState::Faulted
        } else {
            BoundaryState::Normal
        }
    }

    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    /// Expand or collapse the detail panel. No effect unless details are enabled.
    pub fn toggle_details(&mut self) {
        if self.details_enabled {
            self.details_open = !self.details_open;
        }
    }

    /// Render the wrapped content, or the faulted output while faulted.
    pub fn render(&mut self) -> Markup {
        if let Some(fault) = &self.fault {
            return self.faulted_output(fault);
        }

        let content = Arc::clone(&self.content);
        let fault = match catch_unwind(AssertUnwindSafe(|| content.render())) {
            Ok(Ok(markup)) => return markup,
            Ok(Err(e)) => Fault::from_error(&e),
            Err(payload) => Fault::from_panic(payload),
        };

        self.report(&fault);
        let output = self.faulted_output(&fault);
        self.fault = Some(fault);
        output
    }

    /// Clear any fault and render again.
    pub fn retry(&mut self) -> Markup {
        self.fault = None;
        self.details_open = false;
        self.render()
    }

    fn report(&self, fault: &Fault) {
        let context = json!({
            "boundary": "render",
            "kind": fault.kind.to_string(),
            "trace": fault.trace,
        });

        match &self.plugin {
            Some(plugin) => {
                error!(
                    plugin_id = %plugin.id(),
                    plugin_name = plugin.name(),
                    plugin_version = %plugin.version(),
                    error = %fault.message,
                    %context,
                    "plugin render fault contained"
                );
                if let Some(handler) = &self.handler {
                    let err = PluginError::runtime(plugin.id().as_str(), fault.message.clone())
                        .with_context(context.clone());
                    handler.on_runtime_error(plugin, &err, &context);
                }
            }
            None => {
                error!(error = %fault.message, %context, "render fault contained");
            }
        }
    }

    fn faulted_output(&self, fault: &Fault) -> Markup {
        if let Some(fallback) = &self.fallback {
            return fallback(fault);
        }

        let (id, title) = match &self.plugin {
            Some(plugin) => (
                plugin.id().to_string(),
                format!("{} v{}", plugin.name(), plugin.version()),
            ),
            None => ("unknown".to_string(), "Unknown plugin".to_string()),
        };

        let mut panel = format!(
            "<section class=\"tessera-fault\" data-plugin=\"{}\">\
             <h3>{}</h3>\
             <p>This plugin failed to render. The rest of the application is unaffected.</p>\
             <button data-action=\"retry\">Retry</button>",
            escape(&id),
            escape(&title),
        );
        if self.details_enabled {
            panel.push_str(&format!(
                "<details{}><summary>Details</summary><pre class=\"message\">{}</pre><pre class=\"trace\">{}</pre></details>",
                if self.details_open { " open" } else { "" },
                escape(&fault.message),
                escape(&fault.trace),
            ));
        }
        panel.push_str("</section>");
        Markup::new(panel)
    }
}

impl fmt::Debug for FaultBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaultBoundary")
            .field("plugin", &self.plugin.as_ref().map(|p| p.id().to_string()))
            .field("details_enabled", &self.details_enabled)
            .field("fault", &self.fault)
            .finish_non_exhaustive()
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
