//! Integration tests for Settings config loading with layered precedence.
//!
//! These tests run without a global config (temp directories only),
//! so they test local config layered over the compiled defaults.

use std::fs;

use tempfile::TempDir;

use guesstree::application::ApplicationError;
use guesstree::config::{local_config_path, Settings};

#[test]
fn given_local_config_when_load_then_overrides_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let local_config = r#"
[codec]
indent = 2
compact = true

[session]
root_name = "a mystery"
"#;
    fs::write(local_config_path(dir.path()), local_config).unwrap();

    // Act
    let settings = Settings::load(Some(dir.path())).expect("load settings");

    // Assert
    assert_eq!(settings.codec.indent, 2);
    assert!(settings.codec.compact);
    assert_eq!(settings.session.root_name, "a mystery");
}

#[test]
fn given_partial_local_config_when_load_then_keeps_other_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "[arena]\nmax_bytes = 65536\n").unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.arena.max_bytes, Some(65536));
    assert_eq!(settings.arena.slab_size, 1024);
    assert_eq!(settings.codec.max_depth, None);
    assert!(!settings.codec.compact);
}

#[test]
fn given_dir_without_config_when_load_then_uses_defaults() {
    let dir = TempDir::new().unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings, Settings::load(None).expect("load defaults"));
}

#[test]
fn given_knowledge_file_with_tilde_when_load_then_expanded() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "[session]\nknowledge_file = \"~/animals.txt\"\n",
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    let home = std::env::var("HOME").expect("HOME should be set");
    let file = settings.session.knowledge_file.expect("knowledge_file set");
    assert!(file.starts_with(&home), "file: {}", file.display());
    assert!(file.ends_with("animals.txt"));
}

#[test]
fn given_invalid_toml_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "[codec\nindent = ").unwrap();

    let result = Settings::load(Some(dir.path()));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_zero_max_depth_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "[codec]\nmax_depth = 0\n").unwrap();

    let result = Settings::load(Some(dir.path()));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_max_depth_when_load_then_passed_to_codec() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "[codec]\nmax_depth = 64\n").unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.codec_options().max_depth, Some(64));
}

#[test]
fn given_indent_above_limit_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "[codec]\nindent = 70000\n").unwrap();

    let result = Settings::load(Some(dir.path()));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_template_when_written_as_local_config_then_loads() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), Settings::template()).unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.session.root_name, "nothing");
}
