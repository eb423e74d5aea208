// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Descriptor builder for lifecycle tests.
//!
//! Hooks built here push `init:start:<id>`, `init:end:<id>`,
//! `activate:<id>` and `deactivate:<id>` into an [`EventLog`] so tests can
//! assert ordering and call counts.

use std::time::Duration;

use tessera_core::{ComponentLocation, TesseraError};
use tessera_plugin::{Component, Lifecycle, Markup, PluginDescriptor, Route};

use crate::recording::EventLog;

/// Builds descriptors with observable, optionally failing hooks.
#[derive(Debug)]
pub struct PluginBuilder {
    descriptor: PluginDescriptor,
    log: EventLog,
    init_error: Option<String>,
    deactivate_error: Option<String>,
    init_delay: Option<Duration>,
}

impl PluginBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            descriptor: PluginDescriptor::new(id, format!("Plugin {id}"), "1.0.0"),
            log: EventLog::new(),
            init_error: None,
            deactivate_error: None,
            init_delay: None,
        }
    }

    pub fn version(mut self, version: &str) -> Self {
        self.descriptor.version = version.to_string();
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.descriptor.priority = Some(priority);
        self
    }

    pub fn depends_on(mut self, id: &str) -> Self {
        self.descriptor = self.descriptor.with_dependency(id);
        self
    }

    pub fn route(mut self, path: &str, priority: Option<i32>) -> Self {
        let mut route = Route::new(path, Markup::new(format!("<main>{path}</main>")));
        route.priority = priority;
        self.descriptor = self.descriptor.with_route(route);
        self
    }

    pub fn component(mut self, id: &str, location: ComponentLocation, order: Option<i32>) -> Self {
        let mut component = Component::new(id, Markup::new(format!("<div>{id}</div>")), location);
        component.position.order = order;
        self.descriptor = self.descriptor.with_component(component);
        self
    }

    /// Record hook calls into `log`.
    pub fn logging_to(mut self, log: &EventLog) -> Self {
        self.log = log.clone();
        self
    }

    pub fn failing_init(mut self, message: &str) -> Self {
        self.init_error = Some(message.to_string());
        self
    }

    pub fn failing_deactivate(mut self, message: &str) -> Self {
        self.deactivate_error = Some(message.to_string());
        self
    }

    /// Sleep inside `initialize` before completing.
    pub fn init_delay(mut self, delay: Duration) -> Self {
        self.init_delay = Some(delay);
        self
    }

    /// Descriptor without hooks.
    pub fn build_static(self) -> PluginDescriptor {
        self.descriptor
    }

    /// Descriptor with `initialize`, `activate` and `deactivate` hooks.
    pub fn build(self) -> PluginDescriptor {
        let id = self.descriptor.id.clone();
        let Self {
            descriptor,
            log,
            init_error,
            deactivate_error,
            init_delay,
        } = self;

        let init_log = log.clone();
        let init_id = id.clone();
        let activate_log = log.clone();
        let activate_id = id.clone();
        let deactivate_log = log;
        let deactivate_id = id;

        let lifecycle = Lifecycle::default()
            .on_initialize(move |_api| {
                let log = init_log.clone();
                let id = init_id.clone();
                let error = init_error.clone();
                async move {
                    log.push(format!("init:start:{id}"));
                    match init_delay {
                        Some(delay) => tokio::time::sleep(delay).await,
                        None => tokio::task::yield_now().await,
                    }
                    log.push(format!("init:end:{id}"));
                    match error {
                        Some(message) => Err(TesseraError::Internal(message)),
                        None => Ok(()),
                    }
                }
            })
            .on_activate(move || {
                let log = activate_log.clone();
                let id = activate_id.clone();
                async move {
                    log.push(format!("activate:{id}"));
                    Ok(())
                }
            })
            .on_deactivate(move || {
                let log = deactivate_log.clone();
                let id = deactivate_id.clone();
                let error = deactivate_error.clone();
                async move {
                    log.push(format!("deactivate:{id}"));
                    match error {
                        Some(message) => Err(TesseraError::Internal(message)),
                        None => Ok(()),
                    }
                }
            });

        descriptor.with_lifecycle(lifecycle)
    }
}
