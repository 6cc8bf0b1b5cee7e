use super::*;
use common::{context, context_with_config};
use tempfile::TempDir;

mod common {
    use super::*;

    pub(super) fn context() -> (Context, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        (Context::load(temp_dir.path().to_path_buf()).unwrap(), temp_dir)
    }

    pub(super) fn context_with_config(toml: &str) -> (Context, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("config.toml"), toml).unwrap();
        (Context::load(temp_dir.path().to_path_buf()).unwrap(), temp_dir)
    }
}

mod codec {
    use super::*;

    #[test]
    fn test_encode_then_decode() {
        let token = encode("a1b2-uuid", None, Some(1)).unwrap();

        assert_ne!(token, "a1b2-uuid");
        assert_eq!(decode(&token).unwrap(), "a1b2-uuid");
    }

    #[test]
    fn test_encode_short_code() {
        assert_eq!(
            encode("a1b2-uuid", Some("P0042".to_string()), None).unwrap(),
            "P0042"
        );
    }

    #[test]
    fn test_decode_plain_code() {
        assert_eq!(decode(" PREV-0001 ").unwrap(), "PREV-0001");
    }

    #[test]
    fn test_decode_garbage_is_invalid_link() {
        assert!(matches!(decode("not-a-token!!"), Err(CliError::InvalidLink)));
    }

    #[test]
    fn test_encode_blank_project_id() {
        assert!(matches!(
            encode("  ", None, None),
            Err(CliError::InvalidProjectId(_))
        ));
    }
}

mod links {
    use super::*;

    #[test]
    fn test_link_uses_configured_base_url() {
        let (ctx, _temp) =
            context_with_config("[preview]\nbase_url = \"https://studio.example/\"\n");

        let url = link(&ctx, "a1b2-uuid").unwrap();

        assert!(url.starts_with("https://studio.example/preview/"));
        assert_eq!(resolve(&ctx, &url).unwrap(), "a1b2-uuid");
    }

    #[test]
    fn test_resolve_legacy_path() {
        let (ctx, _temp) = context();
        assert_eq!(resolve(&ctx, "/preview/P0001?ref=mail").unwrap(), "P0001");
    }

    #[test]
    fn test_resolve_other_route_is_invalid_link() {
        let (ctx, _temp) = context();
        assert!(matches!(
            resolve(&ctx, "https://studio.example/admin/P0001"),
            Err(CliError::InvalidLink)
        ));
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let (ctx, _temp) = context_with_config("[preview]\nbase_url = \"ftp://nope\"\n");

        let url = link(&ctx, "P0001").unwrap();

        assert_eq!(url, "http://localhost:8080/preview/P0001");
    }
}

mod cache {
    use super::*;

    #[test]
    fn test_set_get_rm() {
        let (ctx, _temp) = context();

        assert_eq!(
            cache_set(&ctx, "auth_hint", r#"{"email":"a@b.c"}"#, None, false).unwrap(),
            ""
        );

        let value: serde_json::Value =
            serde_json::from_str(&cache_get(&ctx, "auth_hint").unwrap()).unwrap();
        assert_eq!(value, serde_json::json!({ "email": "a@b.c" }));

        cache_rm(&ctx, "auth_hint").unwrap();
        assert!(matches!(
            cache_get(&ctx, "auth_hint"),
            Err(CliError::NotCached(_))
        ));
    }

    #[test]
    fn test_set_rejects_invalid_json() {
        let (ctx, _temp) = context();
        assert!(matches!(
            cache_set(&ctx, "auth_hint", "{not json", None, false),
            Err(CliError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_set_rejects_blank_key() {
        let (ctx, _temp) = context();
        assert!(matches!(
            cache_set(&ctx, " ", "1", None, false),
            Err(CliError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_set_without_durable_cache_is_not_persisted() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();
        let ctx = Context::load(blocker.join("data")).unwrap();

        assert!(matches!(
            cache_set(&ctx, "auth_hint", "1", None, true),
            Err(CliError::NotPersisted(_))
        ));
    }

    #[test]
    fn test_sweep_removes_expired() {
        let (ctx, _temp) = context();

        cache_set(&ctx, "utm_params", "{}", Some(0), false).unwrap();
        cache_set(&ctx, "auth_hint", "{}", None, false).unwrap();

        let output = cache_sweep(&ctx).unwrap();

        assert!(output.contains("durable: 1"), "{output}");
        assert!(output.ends_with("total: 1"), "{output}");
        assert!(cache_get(&ctx, "auth_hint").is_ok());
    }
}

mod config {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let (ctx, temp) = context();
        let path = temp.path().join("config.toml");

        assert!(config_init(&ctx).unwrap().starts_with("wrote"));
        let written = std::fs::read_to_string(&path).unwrap();

        assert!(config_init(&ctx).unwrap().ends_with("already exists"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), written);
        assert_eq!(AppConfig::load(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_show_prints_effective_config() {
        let (ctx, _temp) = context_with_config("[storage]\nutm_ttl_days = 90\n");

        let output = config_show(&ctx).unwrap();

        assert!(output.starts_with("# "));
        assert!(output.contains("[preview]"));
        assert!(output.contains("utm_ttl_days = 90"));
    }
}
