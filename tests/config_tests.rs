use std::fs;
use tabsalvage_lib::config::{CONFIG_FILE_NAME, Config, ConfigError, create_default_config};
use tempfile::tempdir;

#[test]
fn test_load_config_file() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let config_path = temp_dir.path().join("custom.toml");
    let config_content = r#"
[scan]
repeat-count = 4
tag-length = 21
advance-after-tag = 2
sentinel = "~"

[output]
right-context-max-chars = 100
write-replaced-text = false
"#;
    fs::write(&config_path, config_content).expect("Failed to write test config file");

    let config_path_str = config_path.to_str().expect("Path should be valid UTF-8");
    let config = Config::load_with_discovery(Some(config_path_str), temp_dir.path(), false)
        .expect("Config loading should succeed");

    assert_eq!(config.scan.repeat_count, 4);
    assert_eq!(config.scan.tag_length, 21);
    assert_eq!(config.scan.advance_after_tag, 2);
    assert_eq!(config.scan.sentinel, '~');
    assert_eq!(config.scan.tag_prefix(), "~~~");
    assert_eq!(config.output.right_context_max_chars, 100);
    assert!(!config.output.write_replaced_text);
    assert!(config.output.write_bookmarks);
}

#[test]
fn test_explicit_path_wins_over_discovery() {
    let temp_dir = tempdir().unwrap();
    fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "[scan]\nsentinel = \"#\"\n").unwrap();
    let explicit = temp_dir.path().join("other.toml");
    fs::write(&explicit, "[scan]\nsentinel = \"^\"\n").unwrap();

    let config = Config::load_with_discovery(explicit.to_str(), temp_dir.path(), false).unwrap();
    assert_eq!(config.scan.sentinel, '^');

    // --no-config does not apply to an explicit path.
    let config = Config::load_with_discovery(explicit.to_str(), temp_dir.path(), true).unwrap();
    assert_eq!(config.scan.sentinel, '^');
}

#[test]
fn test_no_file_uses_defaults() {
    let temp_dir = tempdir().unwrap();
    let config = Config::load_with_discovery(None, temp_dir.path(), false).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_invalid_toml_reports_path() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join(CONFIG_FILE_NAME);
    fs::write(&path, "[scan\nrepeat-count = ").unwrap();

    let err = Config::load_with_discovery(None, temp_dir.path(), false).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
    assert!(err.to_string().contains(CONFIG_FILE_NAME));
}

#[test]
fn test_unknown_section_rejected() {
    let err = Config::from_toml_str("[global]\nenable = []\n", "test.toml").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
fn test_effective_config_serializes() {
    let toml_text = toml::to_string_pretty(&Config::default()).unwrap();
    assert!(toml_text.contains("repeat-count = 5"));
    assert!(toml_text.contains("sentinel = \"|\""));

    let reparsed = Config::from_toml_str(&toml_text, "rendered.toml").unwrap();
    assert_eq!(reparsed, Config::default());

    let json = serde_json::to_value(Config::default()).unwrap();
    assert_eq!(json["scan"]["tag-length"], 19);
    assert_eq!(json["output"]["right-context-max-chars"], 30_000);
}

#[test]
fn test_init_template_is_valid() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join(CONFIG_FILE_NAME);
    create_default_config(path.to_str().unwrap()).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("# tabsalvage configuration file"));
    assert_eq!(Config::load_file(&path).unwrap(), Config::default());
}
