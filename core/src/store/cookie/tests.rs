use super::*;
use std::time::Duration;

fn make_key(s: &str) -> CacheKey {
    CacheKey::try_from(s).unwrap()
}

fn entry(payload: &str, now: SystemTime, ttl: Option<Duration>) -> StoredEntry {
    StoredEntry::new(payload.to_string(), now, ttl)
}

mod crud {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let mut backend = CookieBackend::new();
        let key = make_key("feedback_P0001");
        let stored = entry(r#"{"comments":"a; b, c=d"}"#, SystemTime::now(), None);

        backend.set(&key, &stored).unwrap();
        assert_eq!(backend.get(&key).unwrap(), Some(stored));
    }

    #[test]
    fn test_value_is_header_safe() {
        let mut backend = CookieBackend::new();
        let key = make_key("feedback_P0001");

        backend
            .set(&key, &entry(r#"{"comments":"a; b, c=d"}"#, SystemTime::now(), None))
            .unwrap();

        let header = backend.cookie_header();
        let (name, value) = header.split_once('=').unwrap();
        assert_eq!(name, "feedback_P0001");
        assert!(!value.contains([';', ',', ' ', '"', '=']));
    }

    #[test]
    fn test_remove() {
        let mut backend = CookieBackend::new();
        let key = make_key("auth_hint");

        backend.set(&key, &entry("1", SystemTime::now(), None)).unwrap();
        backend.remove(&key).unwrap();
        assert_eq!(backend.get(&key).unwrap(), None);
    }

    #[test]
    fn test_rejects_non_token_names() {
        let mut backend = CookieBackend::new();
        let key = make_key("feedback_summer jingle");

        assert!(matches!(
            backend.set(&key, &entry("1", SystemTime::now(), None)),
            Err(BackendError::UnsupportedKey(_))
        ));
        assert!(matches!(
            backend.get(&key),
            Err(BackendError::UnsupportedKey(_))
        ));
    }

    #[test]
    fn test_rejects_oversized_cookie() {
        let mut backend = CookieBackend::new();
        let key = make_key("briefing_b1");
        let big = format!("\"{}\"", "x".repeat(MAX_COOKIE_BYTES));

        assert!(matches!(
            backend.set(&key, &entry(&big, SystemTime::now(), None)),
            Err(BackendError::QuotaExceeded { .. })
        ));
        assert_eq!(backend.get(&key).unwrap(), None);
    }

    #[test]
    fn test_disabled_jar_rejects_everything() {
        let mut backend = CookieBackend::disabled();
        let key = make_key("auth_hint");

        assert!(!backend.is_enabled());
        assert!(matches!(
            backend.set(&key, &entry("1", SystemTime::now(), None)),
            Err(BackendError::Disabled)
        ));
        assert!(matches!(backend.get(&key), Err(BackendError::Disabled)));
        assert!(matches!(backend.remove(&key), Err(BackendError::Disabled)));
        assert!(matches!(
            backend.load_header("a=b"),
            Err(BackendError::Disabled)
        ));
    }
}

mod headers {
    use super::*;

    #[test]
    fn test_set_cookie_headers_carry_max_age() {
        let mut backend = CookieBackend::new();
        let now = SystemTime::now();

        backend
            .set(
                &make_key("utm_params"),
                &entry("{}", now, Some(Duration::from_secs(3600))),
            )
            .unwrap();
        backend
            .set(&make_key("auth_hint"), &entry("{}", now, None))
            .unwrap();

        let headers = backend.set_cookie_headers(now);
        assert_eq!(headers.len(), 2);
        // BTreeMap order: auth_hint, utm_params
        assert!(headers[0].starts_with("auth_hint="));
        assert!(!headers[0].contains("Max-Age"));
        assert!(headers[1].starts_with("utm_params="));
        assert!(headers[1].ends_with("; Max-Age=3600"));
    }

    #[test]
    fn test_header_round_trip() {
        let now = SystemTime::now();
        let mut source = CookieBackend::new();
        let key = make_key("feedback_P0001");
        let stored = entry(r#"{"comments":"ça va"}"#, now, Some(Duration::from_secs(60)));
        source.set(&key, &stored).unwrap();

        let mut target = CookieBackend::new();
        let header = format!("_ga=GA1.2.3; {}; broken", source.cookie_header());
        assert_eq!(target.load_header(&header).unwrap(), 1);
        assert_eq!(target.get(&key).unwrap(), Some(stored));

        // Expiry survives the reload.
        assert_eq!(target.sweep_expired(now + Duration::from_secs(60)).unwrap(), 1);
    }
}

#[test]
fn test_sweep_expired() {
    let mut backend = CookieBackend::new();
    let now = SystemTime::now();

    backend
        .set(&make_key("a"), &entry("1", now, Some(Duration::from_secs(5))))
        .unwrap();
    backend.set(&make_key("b"), &entry("2", now, None)).unwrap();

    assert_eq!(backend.sweep_expired(now + Duration::from_secs(4)).unwrap(), 0);
    assert_eq!(backend.sweep_expired(now + Duration::from_secs(5)).unwrap(), 1);
    assert_eq!(backend.get(&make_key("a")).unwrap(), None);
    assert!(backend.get(&make_key("b")).unwrap().is_some());
}
