// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./tessera.toml` > `~/.config/tessera/tessera.toml` > `/etc/tessera/tessera.toml`
//! with environment variable overrides via the `TESSERA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::TesseraConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/tessera/tessera.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "tessera.toml";

/// User config file under the XDG config directory, if one can be resolved.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tessera").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/tessera/tessera.toml`
/// 3. `~/.config/tessera/tessera.toml`
/// 4. `./tessera.toml`
/// 5. `TESSERA_*` environment variables
pub fn load_config() -> Result<TesseraConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string layered over the defaults only.
pub fn load_config_from_str(toml_content: &str) -> Result<TesseraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TesseraConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TesseraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TesseraConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TesseraConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `TESSERA_RUNTIME_*` onto the `[runtime]` section.
///
/// Uses `Env::map()` rather than `Env::split("_")` so that keys such as
/// `max_plugins` keep their underscores. Plugin ids may themselves contain
/// underscores, so `[plugins.*]` is file-only.
fn env_provider() -> Env {
    Env::prefixed("TESSERA_")
        .filter(|key| key.as_str().to_ascii_lowercase().starts_with("runtime_"))
        .map(|key| {
            key.as_str()
                .to_ascii_lowercase()
                .replacen("runtime_", "runtime.", 1)
                .into()
        })
}
