use super::*;

#[test]
fn key_normal_usage() {
    let key_str = "feedback_P0001";
    let key = CacheKey::try_from(key_str).unwrap();
    assert_eq!(key.as_str(), key_str);

    let bytes = <CacheKey as redb::Value>::as_bytes(&key);
    let key_from_bytes = <CacheKey as redb::Value>::from_bytes(bytes);
    assert_eq!(key, key_from_bytes);
}

#[test]
fn key_rejects_empty_string() {
    CacheKey::try_from("").unwrap_err();
}

#[test]
fn key_rejects_whitespace_string() {
    CacheKey::try_from("   ").unwrap_err();
}

#[test]
fn key_rejects_too_long_string() {
    let long_string = "a".repeat(MAX_KEY_LENGTH + 1);
    CacheKey::try_from(long_string.as_str()).unwrap_err();
}

#[test]
fn key_ordering() {
    const KEYS: [&str; 4] = ["a", "b", "a_", "apple"];

    for l in KEYS.iter() {
        for r in KEYS.iter() {
            let key_l = CacheKey::try_from(*l).unwrap();
            let key_r = CacheKey::try_from(*r).unwrap();
            let bytes_l = <CacheKey as redb::Value>::as_bytes(&key_l);
            let bytes_r = <CacheKey as redb::Value>::as_bytes(&key_r);
            assert_eq!(
                <CacheKey as redb::Key>::compare(bytes_l, bytes_r),
                l.cmp(r),
                "Comparing '{}' and '{}'",
                l,
                r
            );
        }
    }
}

mod namespaced {
    use super::*;

    #[test]
    fn feedback_key_uses_project_id() {
        let project_id = ProjectId::try_new("P0042".to_string()).unwrap();
        assert_eq!(CacheKey::feedback(&project_id).as_str(), "feedback_P0042");
    }

    #[test]
    fn briefing_key_trims_id() {
        let key = CacheKey::briefing("  b-17 ").unwrap();
        assert_eq!(key.as_str(), "briefing_b-17");
    }

    #[test]
    fn briefing_key_rejects_blank_id() {
        CacheKey::briefing("   ").unwrap_err();
    }

    #[test]
    fn webhook_key_uses_service_type() {
        let service = ServiceType::try_new("Briefing".to_string()).unwrap();
        assert_eq!(
            CacheKey::webhook_url(&service).as_str(),
            "briefing_webhookUrl"
        );
    }

    #[test]
    fn fixed_keys() {
        assert_eq!(CacheKey::utm_params().as_str(), "utm_params");
        assert_eq!(CacheKey::auth_hint().as_str(), "auth_hint");
    }
}
