// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Diagnostics for `tessera.toml`.
//!
//! Figment errors and validation failures become miette reports that name
//! the section they belong to: `[runtime]` or a `[plugins.<id>]` table.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use std::fmt;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity score to suggest a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// Descriptor fields that only make sense in a plugin's own `plugin.toml`.
const MANIFEST_KEYS: &[&str] = &[
    "id",
    "name",
    "description",
    "dependencies",
    "peer_dependencies",
    "entry",
    "routes",
    "components",
];

/// The part of `tessera.toml` a diagnostic points into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSection {
    Root,
    Runtime,
    Plugin(String),
    Other(String),
}

impl ConfigSection {
    /// Classify a figment key path (without the offending field).
    pub fn from_path(path: &[String]) -> Self {
        match path {
            [] => Self::Root,
            [runtime] if runtime == "runtime" => Self::Runtime,
            [plugins, id, ..] if plugins == "plugins" => Self::Plugin(id.clone()),
            other => Self::Other(other.join(".")),
        }
    }

    /// Candidate table headers for this section, bare and quoted.
    fn headers(&self) -> Vec<String> {
        match self {
            Self::Root => Vec::new(),
            Self::Runtime => vec!["[runtime]".to_string()],
            Self::Plugin(id) => vec![format!("[plugins.{id}]"), format!("[plugins.\"{id}\"]")],
            Self::Other(path) => vec![format!("[{path}]")],
        }
    }
}

impl fmt::Display for ConfigSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("top level"),
            Self::Runtime => f.write_str("[runtime]"),
            Self::Plugin(id) => write!(f, "[plugins.{id}]"),
            Self::Other(path) => write!(f, "[{path}]"),
        }
    }
}

/// A configuration error with rich diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key that no section of `tessera.toml` accepts.
    #[error("unknown key `{key}` in {section}")]
    #[diagnostic(
        code(tessera::config::unknown_key),
        help("{}", unknown_key_help(section, key, suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        section: ConfigSection,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("not a {section} setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong type.
    #[error("invalid type for `{key}`: {detail}")]
    #[diagnostic(code(tessera::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
        #[label("wrong type here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A required key is missing.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(tessera::config::missing_key),
        help("add `{key} = <value>` to your tessera.toml")
    )]
    MissingKey { key: String },

    /// A `[plugins.<id>]` table whose id could never match a plugin.
    #[error("invalid plugin id `{id}`: {reason}")]
    #[diagnostic(
        code(tessera::config::plugin_id),
        help("plugin ids use only ASCII letters, digits, `-` and `_`")
    )]
    InvalidPluginId { id: String, reason: String },

    /// `[plugins.<id>].version` is not a semver requirement.
    #[error("plugins.{plugin_id}.version `{requirement}` is not a valid semver requirement: {reason}")]
    #[diagnostic(
        code(tessera::config::version_requirement),
        help("use a requirement such as `^1.2`, `>=0.3, <2` or `=0.4.1`")
    )]
    InvalidVersionRequirement {
        plugin_id: String,
        requirement: String,
        reason: String,
    },

    /// A `[runtime]` value that parsed but is out of range.
    #[error("validation error: {message}")]
    #[diagnostic(code(tessera::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(tessera::config::other))]
    Other(String),
}

fn unknown_key_help(
    section: &ConfigSection,
    key: &str,
    suggestion: Option<&str>,
    valid_keys: &str,
) -> String {
    if let ConfigSection::Plugin(id) = section
        && MANIFEST_KEYS.contains(&key)
    {
        return format!(
            "`{key}` is declared by the plugin itself in its plugin.toml; \
             [plugins.{id}] only accepts host overrides: {valid_keys}"
        );
    }
    match suggestion {
        Some(s) => format!("did you mean `{s}`? {section} accepts: {valid_keys}"),
        None => format!("{section} accepts: {valid_keys}"),
    }
}

/// Convert a `figment::Error` into diagnostics, one per underlying error.
///
/// `toml_sources` pairs each config file path with its content and is used
/// to attach source spans.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let path: Vec<String> = error.path.clone();
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let section = ConfigSection::from_path(&path);
                    let (span, src) = locate(&error, toml_sources, &section, field);
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        suggestion: suggest_key(field, expected),
                        valid_keys: expected.join(", "),
                        section,
                        span,
                        src,
                    }
                }
                Kind::MissingField(field) => ConfigError::MissingKey {
                    key: qualified(&path, field),
                },
                Kind::InvalidType(actual, expected) => {
                    let (parent, field) = match path.split_last() {
                        Some((field, parent)) => (parent, field.as_str()),
                        None => (&path[..], ""),
                    };
                    let section = ConfigSection::from_path(parent);
                    let (span, src) = locate(&error, toml_sources, &section, field);
                    ConfigError::InvalidType {
                        key: path.join("."),
                        detail: format!("found {actual}, expected {expected}"),
                        expected: expected.to_string(),
                        span,
                        src,
                    }
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

fn qualified(path: &[String], field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{}.{field}", path.join("."))
    }
}

fn locate(
    error: &figment::error::Error,
    toml_sources: &[(String, String)],
    section: &ConfigSection,
    field: &str,
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    if field.is_empty() {
        return (None, None);
    }
    let file = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    // Inline strings carry no file source; a single source is unambiguous.
    let source = match file {
        Some(file) => toml_sources.iter().find(|(p, _)| *p == file),
        None if toml_sources.len() == 1 => toml_sources.first(),
        None => None,
    };

    source
        .and_then(|(path, content)| {
            let offset = find_key_offset(content, section, field)?;
            Some((
                Some(SourceSpan::new(offset.into(), field.len())),
                Some(NamedSource::new(path, content.clone())),
            ))
        })
        .unwrap_or((None, None))
}

/// Byte offset of `field` within `section` of a `tessera.toml` document.
///
/// Plugin tables are matched in both `[plugins.acl-audit]` and
/// `[plugins."acl-audit"]` spelling. The search stops at the next table
/// header so a key is never attributed to the wrong plugin.
pub fn find_key_offset(content: &str, section: &ConfigSection, field: &str) -> Option<usize> {
    let start = match section {
        ConfigSection::Root => 0,
        _ => section
            .headers()
            .iter()
            .find_map(|header| content.find(header.as_str()).map(|pos| pos + header.len()))?,
    };

    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') && !matches!(section, ConfigSection::Root) && offset != start {
            return None;
        }
        if let Some(after) = trimmed.strip_prefix(field)
            && after.trim_start().starts_with('=')
        {
            return Some(offset + (line.len() - trimmed.len()));
        }
        offset += line.len();
    }
    None
}

/// Closest valid key by Jaro-Winkler similarity, if any is close enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Render diagnostics to stderr using miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        if handler.render_report(&mut buf, error as &dyn Diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}
