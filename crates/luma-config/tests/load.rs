#![allow(
  clippy::expect_used,
  clippy::unwrap_used,
  clippy::panic,
  reason = "Fine in tests"
)]
use std::{fs, path::PathBuf};

use luma_config::{Config, ConfigError, DocstringMarkup};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
  let path = dir.path().join(name);
  fs::write(&path, content).expect("failed to write config file");
  path
}

#[test]
fn test_from_file_toml() {
  let dir = TempDir::new().unwrap();
  let path = write(
    &dir,
    "luma.toml",
    "docstring_markup = \"rst\"\n\n[render]\nheading_level = 3\n",
  );

  let config = Config::from_file(&path).unwrap();
  assert_eq!(config.docstring_markup, DocstringMarkup::Rst);
  assert_eq!(config.render.heading_level, 3);
  assert_eq!(config.signature.max_width, 88);
}

#[test]
fn test_from_file_json() {
  let dir = TempDir::new().unwrap();
  let path = write(
    &dir,
    "luma.json",
    r#"{ "markup": { "doctest_language": "pycon" } }"#,
  );

  let config = Config::from_file(&path).unwrap();
  assert_eq!(config.markup.doctest_language, "pycon");
  assert_eq!(config.markup.max_depth, 32);
}

#[test]
fn test_from_file_rejects_unknown_formats() {
  let dir = TempDir::new().unwrap();

  let yaml = write(&dir, "luma.yaml", "render: {}\n");
  let err = Config::from_file(&yaml).unwrap_err();
  assert!(err.to_string().contains("Unsupported config file format"));

  let bare = write(&dir, "lumarc", "");
  let err = Config::from_file(&bare).unwrap_err();
  assert!(err.to_string().contains("no extension"));
}

#[test]
fn test_from_file_reports_parse_and_io_errors() {
  let dir = TempDir::new().unwrap();

  let broken = write(&dir, "broken.toml", "[render\n");
  let err = Config::from_file(&broken).unwrap_err();
  assert!(err.to_string().contains("Failed to parse TOML config"));

  let missing = dir.path().join("missing.toml");
  assert!(matches!(Config::from_file(&missing), Err(ConfigError::Io(_))));
}

#[test]
fn test_load_merges_files_in_order() {
  let dir = TempDir::new().unwrap();
  let base = write(
    &dir,
    "base.toml",
    "[signature]\nmax_width = 100\nindent = 2\n",
  );
  let local = write(&dir, "local.json", r#"{ "signature": { "indent": 8 } }"#);

  let config = Config::load(&[base, local], &[]).unwrap();
  assert_eq!(config.signature.max_width, 100);
  assert_eq!(config.signature.indent, 8);
}

#[test]
fn test_load_applies_overrides_last() {
  let dir = TempDir::new().unwrap();
  let base = write(&dir, "base.toml", "[render]\nlanguage = \"py\"\n");

  let config =
    Config::load(&[base], &["render.language=python3".to_string()]).unwrap();
  assert_eq!(config.render.language, "python3");
}

#[test]
fn test_load_without_files_uses_defaults() {
  let config = Config::load::<PathBuf>(&[], &[]).unwrap();
  assert_eq!(config, Config::default());
}

#[test]
fn test_load_validates_the_result() {
  let dir = TempDir::new().unwrap();
  let bad = write(&dir, "bad.toml", "[render]\nheading_level = 9\n");

  let err = Config::load(&[bad], &[]).unwrap_err();
  assert!(matches!(err, ConfigError::Invalid(_)));
  assert!(err.to_string().contains("heading_level"));

  let err = Config::load::<PathBuf>(&[], &["markup.max_depth=0".to_string()])
    .unwrap_err();
  assert!(matches!(err, ConfigError::Invalid(_)));
}
