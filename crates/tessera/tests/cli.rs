// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests running the `tessera` binary against a scratch directory.

use std::path::Path;
use std::process::{Command, Output};

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tessera"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("binary should run")
}

fn write_config(dir: &Path, extra: &str) {
    let config = format!(
        "[runtime]\nlog_level = \"error\"\ninstall_dir = \"{}\"\nstore_path = \"{}\"\n{extra}",
        dir.join("plugins").display(),
        dir.join("store.json").display(),
    );
    std::fs::write(dir.join("tessera.toml"), config).unwrap();
}

#[test]
fn plugins_lists_builtin_catalog() {
    let tmp = tempfile::tempdir().unwrap();
    write_config(tmp.path(), "");

    let output = run(tmp.path(), &["--plain", "plugins"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("acl-audit"));
    assert!(stdout.contains("role-inspector"));
    assert!(stdout.contains("initialized"));
}

#[test]
fn stats_json_reflects_config_disabled_plugin() {
    let tmp = tempfile::tempdir().unwrap();
    write_config(tmp.path(), "\n[plugins.role-inspector]\nenabled = false\n");

    let output = run(tmp.path(), &["stats", "--json"]);
    assert!(output.status.success());
    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["disabled"], 1);
}

#[test]
fn render_unknown_path_fails() {
    let tmp = tempfile::tempdir().unwrap();
    write_config(tmp.path(), "");

    let output = run(tmp.path(), &["render", "/nowhere"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no route mounted"));
}

#[test]
fn invalid_config_exits_with_diagnostics() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("tessera.toml"), "[runtime]\nmax_plugin = 3\n").unwrap();

    let output = run(tmp.path(), &["plugins"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("max_plugin"));
}
