// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Tessera plugin runtime.
//!
//! Holds the error taxonomy and the small closed enums shared by the
//! configuration layer and the plugin runtime.

pub mod error;
pub mod types;

pub use error::{PluginError, TesseraError};
pub use types::{
    ComponentLocation, DEFAULT_PRIORITY, InvalidPluginId, Layout, NotificationKind, PluginErrorKind,
    PluginId, TriggerKind,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tessera_error_has_all_variants() {
        let _config = TesseraError::Config("test".into());
        let _plugin = TesseraError::Plugin(PluginError::load("x", "bad"));
        let _storage = TesseraError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _api = TesseraError::ApiUnavailable;
        let _timeout = TesseraError::Timeout {
            duration: std::time::Duration::from_secs(5),
        };
        let _render = TesseraError::Render("test".into());
        let _internal = TesseraError::Internal("test".into());
    }

    #[test]
    fn plugin_error_display_names_kind_and_id() {
        let err = PluginError::dependency("role-inspector", "missing acl-audit");
        assert_eq!(
            err.to_string(),
            "plugin `role-inspector` dependency error: missing acl-audit"
        );
        let wrapped: TesseraError = err.into();
        assert_eq!(
            wrapped.as_plugin_error().map(|e| e.kind),
            Some(PluginErrorKind::Dependency)
        );
    }

    #[test]
    fn api_unavailable_message_is_fixed() {
        assert_eq!(TesseraError::ApiUnavailable.to_string(), "API client not available");
    }

    #[test]
    fn plugin_error_builders_attach_cause_and_context() {
        let io = std::io::Error::other("disk gone");
        let err = PluginError::runtime("acl-audit", "deactivate failed")
            .with_cause(&io)
            .with_context(serde_json::json!({"action": "disable"}));
        assert_eq!(err.cause.as_deref(), Some("disk gone"));
        assert_eq!(err.context.unwrap()["action"], "disable");
    }
}
