// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared descriptor enums and identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Priority assigned to plugins, routes and components that do not declare one.
///
/// Lower values take precedence.
pub const DEFAULT_PRIORITY: i32 = 1000;

/// Category of a [`PluginError`](crate::error::PluginError).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PluginErrorKind {
    /// Malformed or duplicate descriptor.
    Load,
    /// A lifecycle hook failed.
    Init,
    /// Fault while mounted, including deactivation failures.
    Runtime,
    /// Unmet dependency graph.
    Dependency,
    /// Reserved for host permission checks.
    Permission,
}

/// Page chrome a route asks the host to render around it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Default,
    Minimal,
    Custom,
}

/// How a component is brought on screen.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Button,
    Menu,
    #[default]
    Hook,
    Event,
}

/// Extension point a component is mounted into.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ComponentLocation {
    Header,
    Sidebar,
    Footer,
    Modal,
    #[default]
    Inline,
}

/// Severity of a user-facing notification.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

/// A validated plugin identifier (`[A-Za-z0-9_-]+`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PluginId(String);

/// Reason a string was rejected as a [`PluginId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidPluginId {
    #[error("plugin id must not be empty")]
    Empty,
    #[error("plugin id `{0}` may only contain letters, digits, `_` and `-`")]
    Charset(String),
}

impl PluginId {
    pub fn parse(raw: &str) -> Result<Self, InvalidPluginId> {
        if raw.is_empty() {
            return Err(InvalidPluginId::Empty);
        }
        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(InvalidPluginId::Charset(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PluginId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for PluginId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PluginId {
    type Error = InvalidPluginId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PluginId> for String {
    fn from(id: PluginId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    #[test]
    fn plugin_id_rejects_empty() {
        assert_eq!(PluginId::parse(""), Err(InvalidPluginId::Empty));
    }

    #[test]
    fn plugin_id_rejects_dots_and_spaces() {
        assert!(matches!(PluginId::parse("acl.audit"), Err(InvalidPluginId::Charset(_))));
        assert!(matches!(PluginId::parse("acl audit"), Err(InvalidPluginId::Charset(_))));
    }

    #[test]
    fn plugin_id_deserializes_through_validation() {
        let ok: PluginId = serde_json::from_str("\"role_inspector-2\"").unwrap();
        assert_eq!(ok.as_str(), "role_inspector-2");
        assert!(serde_json::from_str::<PluginId>("\"@scope/x\"").is_err());
    }

    #[test]
    fn enums_parse_lowercase() {
        assert_eq!(Layout::from_str("minimal").unwrap(), Layout::Minimal);
        assert_eq!(ComponentLocation::from_str("sidebar").unwrap(), ComponentLocation::Sidebar);
        assert_eq!(TriggerKind::from_str("menu").unwrap(), TriggerKind::Menu);
        assert_eq!(PluginErrorKind::Dependency.to_string(), "dependency");
        assert_eq!(NotificationKind::default(), NotificationKind::Info);
    }

    proptest! {
        #[test]
        fn plugin_id_accepts_charset(raw in "[A-Za-z0-9_-]{1,32}") {
            let id = PluginId::parse(&raw).unwrap();
            prop_assert_eq!(id.as_str(), raw.as_str());
        }

        #[test]
        fn plugin_id_rejects_foreign_chars(prefix in "[a-z]{0,8}", bad in "[./@ :!]", suffix in "[a-z]{0,8}") {
            let raw = format!("{prefix}{bad}{suffix}");
            prop_assert!(PluginId::parse(&raw).is_err());
        }
    }
}
