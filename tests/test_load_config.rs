use std::env;
use std::fs::write;
use std::path::PathBuf;

use asset_squeeze::config::DEFAULT_CACHE_LOCATION;
use asset_squeeze::load_config::{load_config, parse_config, CACHE_ENV, CACHE_LOCATION_ENV};
use asset_squeeze::matcher::{matches, MatchRule};
use serial_test::serial;
use tempfile::NamedTempFile;

fn clear_env() {
    env::remove_var(CACHE_ENV);
    env::remove_var(CACHE_LOCATION_ENV);
}

/// A config with only the output directory gets every default.
#[test]
#[serial]
fn test_minimal_config_applies_defaults() {
    clear_env();
    let config = parse_config("output_dir: ./dist\n").expect("Config should load");

    assert_eq!(config.output_dir, PathBuf::from("./dist"));
    assert_eq!(config.public_dir, None);
    assert!(config.include_public);
    assert!(!config.cache);
    assert_eq!(config.cache_location, PathBuf::from(DEFAULT_CACHE_LOCATION));
    assert!(config.log_stats);
    assert!(config.ansi_colors);
    assert!(config.selection.include.is_none());
    assert!(config.selection.exclude.is_none());

    let test = config.selection.test.as_ref().expect("default test pattern");
    for name in ["a.png", "b.JPG", "c.jpeg", "d.svg", "e.webp", "f.avif"] {
        assert!(test.is_match(name), "{name} should be matched by default");
    }
    assert!(!test.is_match("app.js"));
}

#[test]
#[serial]
fn test_rule_shapes_are_mapped() {
    clear_env();
    let yaml = r#"
output_dir: dist
include: logo.png
exclude:
  pattern: "^vendor-"
test: "\\.png$"
formats:
  .PNG:
    command: pngquant
    args: ["-", "--quality", "60-80"]
"#;
    let config = parse_config(yaml).expect("Config should load");

    assert!(matches!(
        &config.selection.include,
        Some(MatchRule::Exact(name)) if name == "logo.png"
    ));
    let exclude = config.selection.exclude.as_ref().unwrap();
    assert!(matches("vendor-a.png", Some(exclude)));
    assert!(!matches("a.png", Some(exclude)));
    assert!(config.selection.test.as_ref().unwrap().is_match("x.png"));

    let png = config.formats.get("png").expect("extension key is normalised");
    assert_eq!(png.command.as_deref(), Some("pngquant"));
    assert_eq!(png.args, vec!["-", "--quality", "60-80"]);
}

#[test]
#[serial]
fn test_list_rule_becomes_a_set() {
    clear_env();
    let config = parse_config("output_dir: dist\nexclude: [a.png, b.png]\n").unwrap();
    let exclude = config.selection.exclude.as_ref().unwrap();
    assert!(matches("a.png", Some(exclude)));
    assert!(matches("b.png", Some(exclude)));
    assert!(!matches("c.png", Some(exclude)));
}

#[test]
#[serial]
fn test_unrecognized_rule_shape_matches_nothing() {
    clear_env();
    let config = parse_config("output_dir: dist\ninclude: 42\nexclude: [a.png, 3]\n").unwrap();
    assert!(matches!(config.selection.include, Some(MatchRule::Unrecognized(_))));
    assert!(matches!(config.selection.exclude, Some(MatchRule::Unrecognized(_))));
    assert!(!matches("42", config.selection.include.as_ref()));
    assert!(!matches("a.png", config.selection.exclude.as_ref()));
}

#[test]
#[serial]
fn test_invalid_regex_is_a_load_error() {
    clear_env();
    let err = parse_config("output_dir: dist\ntest: \"(unclosed\"\n").unwrap_err();
    assert!(err.to_string().contains("test"), "got: {err}");

    let err = parse_config("output_dir: dist\ninclude:\n  pattern: \"[\"\n").unwrap_err();
    assert!(err.to_string().contains("include"), "got: {err}");
}

#[test]
#[serial]
fn test_env_overrides_cache_settings() {
    clear_env();
    env::set_var(CACHE_ENV, "true");
    env::set_var(CACHE_LOCATION_ENV, "/tmp/asset-squeeze-cache");

    let config = parse_config("output_dir: dist\ncache: false\ncache_location: .cache\n").unwrap();
    assert!(config.cache);
    assert_eq!(config.cache_location, PathBuf::from("/tmp/asset-squeeze-cache"));

    env::set_var(CACHE_ENV, "maybe");
    let err = parse_config("output_dir: dist\n").unwrap_err();
    assert!(err.to_string().contains(CACHE_ENV), "got: {err}");
    clear_env();
}

#[test]
#[serial]
fn test_load_config_reads_file() {
    clear_env();
    let config_file = NamedTempFile::new().expect("temp file");
    write(
        config_file.path(),
        "output_dir: ./out\npublic_dir: ./public\ninclude_public: false\nlog_stats: false\n",
    )
    .unwrap();

    let config = load_config(config_file.path()).expect("Config should load");
    assert_eq!(config.public_dir, Some(PathBuf::from("./public")));
    assert!(!config.include_public);
    assert!(!config.log_stats);
}

/// This test ensures that if the config file is not valid YAML, load_config errors and reports as such.
#[test]
#[serial]
fn test_load_config_errors_for_invalid_file() {
    clear_env();
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), b"not-yaml: [:::").unwrap();

    let err = load_config(config_file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("parse") || msg.contains("YAML"),
        "Parse error expected, got: {msg}"
    );
}

#[test]
#[serial]
fn test_load_config_errors_for_missing_file() {
    let err = load_config("/definitely/not/here.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}
