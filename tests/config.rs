use backoffice::config::Config;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert!(!config.database.in_memory);
    assert!(config.database.path.is_none());
    assert!(config.logging.enabled);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_config_validation() {
    let mut config = Config::default();

    // Valid config should pass
    assert!(config.validate().is_ok());

    // Unknown log level should fail
    config.logging.level = "verbose".to_string();
    assert!(config.validate().is_err());

    // Reset and test conflicting database settings
    config.logging.level = "debug".to_string();
    config.database.in_memory = true;
    config.database.path = Some("backoffice.db".into());
    assert!(config.validate().is_err());
}

#[test]
fn test_config_serialization() {
    let config = Config::default();
    let toml_str = toml::to_string_pretty(&config).unwrap();
    assert!(toml_str.contains("in_memory = false"));
    assert!(toml_str.contains("level = \"info\""));
}

#[test]
fn test_partial_config_deserialization() {
    // Partial TOML configs merge with defaults
    let partial_toml = r#"
[database]
in_memory = true

[logging]
level = "debug"
"#;

    let config: Config = toml::from_str(partial_toml).unwrap();

    assert!(config.database.in_memory);
    assert_eq!(config.logging.level, "debug");

    // Unspecified values use defaults
    assert!(config.logging.enabled);
    assert!(config.database.path.is_none());
}

#[test]
fn test_level_filter_mapping() {
    let mut config = Config::default();
    assert_eq!(config.logging.level_filter(), log::LevelFilter::Info);

    config.logging.level = "error".to_string();
    assert_eq!(config.logging.level_filter(), log::LevelFilter::Error);
}

#[test]
fn test_generate_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    Config::generate_default_config(&path).unwrap();

    let config = Config::load_from_file(&path).unwrap();
    assert!(!config.database.in_memory);
}
