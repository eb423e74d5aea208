// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use tessera_core::PluginId;

use crate::diagnostic::ConfigError;
use crate::model::TesseraConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every error rather than failing fast.
pub fn validate_config(config: &TesseraConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.runtime.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "runtime.log_level `{}` is not one of {}",
                config.runtime.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.runtime.max_plugins == 0 {
        errors.push(ConfigError::Validation {
            message: "runtime.max_plugins must be at least 1".to_string(),
        });
    }

    if config.runtime.init_timeout_ms == Some(0) {
        errors.push(ConfigError::Validation {
            message: "runtime.init_timeout_ms must be greater than 0 when set".to_string(),
        });
    }

    if config.runtime.store_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "runtime.store_path must not be empty".to_string(),
        });
    }

    for (id, settings) in &config.plugins {
        if let Err(e) = PluginId::parse(id) {
            errors.push(ConfigError::InvalidPluginId {
                id: id.clone(),
                reason: e.to_string(),
            });
        }

        if let Some(req) = &settings.version
            && let Err(e) = semver::VersionReq::parse(req)
        {
            errors.push(ConfigError::InvalidVersionRequirement {
                plugin_id: id.clone(),
                requirement: req.clone(),
                reason: e.to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PluginSettings;

    fn messages(errors: &[ConfigError]) -> Vec<String> {
        errors.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&TesseraConfig::default()).is_ok());
    }

    #[test]
    fn zero_limits_fail() {
        let mut config = TesseraConfig::default();
        config.runtime.max_plugins = 0;
        config.runtime.init_timeout_ms = Some(0);
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn bad_log_level_fails() {
        let mut config = TesseraConfig::default();
        config.runtime.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(messages(&errors)[0].contains("runtime.log_level"));
    }

    #[test]
    fn plugin_ids_and_requirements_are_checked() {
        let mut config = TesseraConfig::default();
        config
            .plugins
            .insert("bad id".to_string(), PluginSettings::default());
        config.plugins.insert(
            "acl-audit".to_string(),
            PluginSettings {
                version: Some("not a req".to_string()),
                ..PluginSettings::default()
            },
        );
        let errors = validate_config(&config).unwrap_err();
        let msgs = messages(&errors);
        assert_eq!(msgs.len(), 2);
        assert!(errors.iter().any(|e| matches!(e, ConfigError::InvalidPluginId { id, .. } if id == "bad id")));
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::InvalidVersionRequirement { plugin_id, .. } if plugin_id == "acl-audit"
        )));
        assert!(msgs.iter().any(|m| m.contains("not a valid semver requirement")));
    }

    #[test]
    fn valid_requirement_passes() {
        let mut config = TesseraConfig::default();
        config.plugins.insert(
            "acl-audit".to_string(),
            PluginSettings {
                version: Some(">=0.2, <2".to_string()),
                ..PluginSettings::default()
            },
        );
        assert!(validate_config(&config).is_ok());
    }
}
