use super::*;
use tempfile::tempdir;

#[test]
fn test_load_missing_file_returns_defaults() {
    let temp = tempdir().unwrap();
    let config = AppConfig::load(&temp.path().join("config.toml")).unwrap();
    assert_eq!(config, AppConfig::default());
}

#[test]
fn test_save_then_load() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("nested").join("config.toml");

    let mut config = AppConfig::default();
    config.preview.base_url = "https://studio.example".to_string();
    config.preview.link_ttl_hours = 72;
    config.storage.cookies_enabled = false;

    config.save(&path).unwrap();
    assert_eq!(AppConfig::load(&path).unwrap(), config);
}

#[test]
fn test_partial_file_fills_defaults() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, "[storage]\nutm_ttl_days = 90\n").unwrap();

    let config = AppConfig::load(&path).unwrap();
    assert_eq!(config.storage.utm_ttl_days, 90);
    assert_eq!(config.storage.feedback_draft_ttl_days, 30);
    assert!(config.storage.cookies_enabled);
    assert_eq!(config.preview, PreviewConfig::default());
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, "[storage\n").unwrap();

    assert!(matches!(
        AppConfig::load(&path),
        Err(AppConfigError::Parse(_))
    ));
}

#[test]
fn test_default_is_valid() {
    assert!(AppConfig::default().validate().is_empty());
}

#[test]
fn test_validate_flags_zero_ttl_and_bad_url() {
    let mut config = AppConfig::default();
    config.preview.base_url = "ftp://files.example".to_string();
    config.storage.feedback_draft_ttl_days = 0;
    config.storage.session_quota_bytes = 10;

    let errors = config.validate();
    assert_eq!(errors.len(), 3);
    assert!(errors.iter().any(|e| e.contains("base_url")));
    assert!(errors.iter().any(|e| e.contains("feedback_draft_ttl_days")));
    assert!(errors.iter().any(|e| e.contains("session_quota_bytes")));
}

#[test]
fn test_with_defaults_for_invalid() {
    let mut config = AppConfig::default();
    config.preview.base_url = "not a url".to_string();
    config.preview.link_ttl_hours = 12;
    config.storage.utm_ttl_days = 0;
    config.storage.briefing_draft_ttl_days = 3;

    let fixed = config.with_defaults_for_invalid();
    assert!(fixed.validate().is_empty());
    assert_eq!(fixed.preview.base_url, PreviewConfig::default().base_url);
    assert_eq!(fixed.preview.link_ttl_hours, 12);
    assert_eq!(fixed.storage.utm_ttl_days, 30);
    assert_eq!(fixed.storage.briefing_draft_ttl_days, 3);
}

#[test]
fn test_link_ttl() {
    let mut preview = PreviewConfig::default();
    assert_eq!(preview.link_ttl(), None);

    preview.link_ttl_hours = 2;
    assert_eq!(preview.link_ttl(), Some(Duration::from_secs(7200)));
}
