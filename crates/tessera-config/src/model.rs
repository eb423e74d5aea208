// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Tessera plugin runtime.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Tessera configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides for the `[runtime]` section.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TesseraConfig {
    /// Runtime-wide settings (logging, limits, discovery paths).
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Per-plugin overrides keyed by plugin id.
    #[serde(default)]
    pub plugins: BTreeMap<String, PluginSettings>,
}

impl TesseraConfig {
    /// Builds the host-owned plugin configuration consumed by the registry.
    pub fn plugin_config(&self) -> PluginConfig {
        PluginConfig {
            plugins: self
                .plugins
                .iter()
                .map(|(id, settings)| (id.clone(), settings.clone()))
                .collect(),
            max_plugins: Some(self.runtime.max_plugins),
            timeout: self.runtime.init_timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Runtime-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Upper bound on the number of plugins held in the active set.
    #[serde(default = "default_max_plugins")]
    pub max_plugins: usize,

    /// Per-hook initialization timeout. `None` awaits hooks without a bound.
    #[serde(default)]
    pub init_timeout_ms: Option<u64>,

    /// Directory holding installed `tessera-plugin-*` packages.
    #[serde(default = "default_install_dir")]
    pub install_dir: String,

    /// Optional directory of in-repo extension packages.
    #[serde(default)]
    pub local_dir: Option<String>,

    /// JSON file backing the per-plugin config store.
    #[serde(default = "default_store_path")]
    pub store_path: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            max_plugins: default_max_plugins(),
            init_timeout_ms: None,
            install_dir: default_install_dir(),
            local_dir: None,
            store_path: default_store_path(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_plugins() -> usize {
    64
}

fn default_install_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("tessera").join("plugins"))
        .unwrap_or_else(|| std::path::PathBuf::from("./plugins"))
        .to_string_lossy()
        .to_string()
}

fn default_store_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("tessera").join("plugin-store.json"))
        .unwrap_or_else(|| std::path::PathBuf::from("./plugin-store.json"))
        .to_string_lossy()
        .to_string()
}

/// Host overrides for a single plugin.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PluginSettings {
    /// `false` keeps the plugin out of the active set entirely.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Semver requirement the plugin version must satisfy (e.g. `^1.2`).
    #[serde(default)]
    pub version: Option<String>,

    /// Replaces the descriptor priority for ordering.
    #[serde(default)]
    pub priority: Option<i32>,

    /// Host-supplied configuration values layered over the descriptor's.
    #[serde(default)]
    pub config: BTreeMap<String, serde_json::Value>,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            version: None,
            priority: None,
            config: BTreeMap::new(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// Host-owned plugin configuration handed to the registry.
///
/// Separate from a plugin's own `config` bag.
#[derive(Debug, Clone, Default)]
pub struct PluginConfig {
    pub plugins: HashMap<String, PluginSettings>,
    pub max_plugins: Option<usize>,
    pub timeout: Option<Duration>,
}

impl PluginConfig {
    pub fn settings(&self, plugin_id: &str) -> Option<&PluginSettings> {
        self.plugins.get(plugin_id)
    }

    /// True only when the host explicitly set `enabled = false`.
    pub fn is_disabled(&self, plugin_id: &str) -> bool {
        self.settings(plugin_id).is_some_and(|s| !s.enabled)
    }

    pub fn with_plugin(mut self, plugin_id: &str, settings: PluginSettings) -> Self {
        self.plugins.insert(plugin_id.to_string(), settings);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = TesseraConfig::default();
        assert_eq!(config.runtime.log_level, "info");
        assert_eq!(config.runtime.max_plugins, 64);
        assert!(config.runtime.init_timeout_ms.is_none());
        assert!(config.runtime.install_dir.ends_with("plugins"));
        assert!(config.plugins.is_empty());
    }

    #[test]
    fn plugin_section_parses_nested_config() {
        let toml_str = r#"
[plugins.acl-audit]
enabled = true
version = "^0.3"
priority = 5

[plugins.acl-audit.config]
retention_days = 30
banner = "audit on"

[plugins.role-inspector]
enabled = false
"#;
        let config: TesseraConfig = toml::from_str(toml_str).unwrap();
        let audit = &config.plugins["acl-audit"];
        assert_eq!(audit.version.as_deref(), Some("^0.3"));
        assert_eq!(audit.priority, Some(5));
        assert_eq!(audit.config["retention_days"], serde_json::json!(30));
        assert!(!config.plugins["role-inspector"].enabled);
    }

    #[test]
    fn plugin_settings_deny_unknown_fields() {
        let toml_str = r#"
[plugins.acl-audit]
enabeld = false
"#;
        assert!(toml::from_str::<TesseraConfig>(toml_str).is_err());
    }

    #[test]
    fn plugin_config_reports_explicit_disable_only() {
        let mut config = TesseraConfig::default();
        config.plugins.insert(
            "off".to_string(),
            PluginSettings {
                enabled: false,
                ..PluginSettings::default()
            },
        );
        config.plugins.insert("on".to_string(), PluginSettings::default());
        config.runtime.init_timeout_ms = Some(1500);

        let plugin_config = config.plugin_config();
        assert!(plugin_config.is_disabled("off"));
        assert!(!plugin_config.is_disabled("on"));
        assert!(!plugin_config.is_disabled("unknown"));
        assert_eq!(plugin_config.max_plugins, Some(64));
        assert_eq!(plugin_config.timeout, Some(Duration::from_millis(1500)));
    }
}
