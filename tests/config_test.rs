use claude_burn_bar::config::Config;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

const OVERRIDE_VARS: &[&str] = &[
    "LOG_LEVEL",
    "LOG_FORMAT",
    "XDG_CONFIG_HOME",
    "CLAUDE_CONFIG_DIR",
    "CLAUDE_BURN_REMOTE_PRICING",
    "CLAUDE_BURN_PRICING_URL",
    "CLAUDE_BURN_PRICING_TTL_SECS",
    "CLAUDE_BURN_REFRESH_SECS",
];

fn clear_overrides() {
    for var in OVERRIDE_VARS {
        env::remove_var(var);
    }
}

// Environment is process-wide, so every env case lives in this one test.
#[test]
fn test_environment_overrides() {
    clear_overrides();

    env::set_var("LOG_LEVEL", "debug");
    env::set_var("LOG_FORMAT", "json");
    env::set_var("XDG_CONFIG_HOME", "/tmp/xdg");
    env::set_var("CLAUDE_CONFIG_DIR", "/a/claude, ,/b/claude");
    env::set_var("CLAUDE_BURN_REMOTE_PRICING", "false");
    env::set_var("CLAUDE_BURN_PRICING_URL", "http://localhost:9/prices.json");
    env::set_var("CLAUDE_BURN_PRICING_TTL_SECS", "120");
    env::set_var("CLAUDE_BURN_REFRESH_SECS", "15");

    let mut config = Config::default();
    config.apply_env_overrides().unwrap();
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "json");
    assert_eq!(config.paths.config_home, PathBuf::from("/tmp/xdg"));
    assert_eq!(
        config.paths.extra_roots,
        vec![PathBuf::from("/a/claude"), PathBuf::from("/b/claude")]
    );
    assert!(!config.pricing.remote_enabled);
    assert_eq!(config.pricing.catalog_url, "http://localhost:9/prices.json");
    assert_eq!(config.pricing.ttl_secs, 120);
    assert_eq!(config.refresh.interval_secs, 15);
    assert!(config.validate().is_ok());

    // Blank XDG_CONFIG_HOME keeps the default
    clear_overrides();
    env::set_var("XDG_CONFIG_HOME", "  ");
    let mut config = Config::default();
    let default_home = config.paths.config_home.clone();
    config.apply_env_overrides().unwrap();
    assert_eq!(config.paths.config_home, default_home);

    clear_overrides();
    env::set_var("CLAUDE_BURN_PRICING_TTL_SECS", "soon");
    assert!(Config::default().apply_env_overrides().is_err());

    clear_overrides();
    env::set_var("CLAUDE_BURN_REFRESH_SECS", "0");
    let mut config = Config::default();
    config.apply_env_overrides().unwrap();
    assert!(config.validate().is_err());

    clear_overrides();
}

#[test]
fn test_validation_rejects_unknown_log_settings() {
    let mut config = Config::default();
    config.logging.output = "syslog".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.logging.format = "xml".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.pricing.ttl_secs = 0;
    assert!(config.validate().is_err());
}

#[cfg(feature = "basic")]
#[test]
fn test_partial_toml_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("claude-burn-bar.toml");
    std::fs::write(
        &path,
        r#"
[paths]
extra_roots = ["/srv/claude"]

[pricing]
remote_enabled = false
ttl_secs = 900

[refresh]
interval_secs = 30
"#,
    )
    .unwrap();

    let config = Config::load_from_file(&path).unwrap();
    assert_eq!(config.paths.extra_roots, vec![PathBuf::from("/srv/claude")]);
    assert!(!config.pricing.remote_enabled);
    assert_eq!(config.pricing.ttl_secs, 900);
    assert_eq!(config.pricing.retry_secs, 300);
    assert_eq!(config.refresh.interval_secs, 30);
    assert_eq!(config.logging.level, "WARN");
}

#[cfg(feature = "basic")]
#[test]
fn test_invalid_toml_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[pricing\nttl_secs = ").unwrap();

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to parse config file"));
}
