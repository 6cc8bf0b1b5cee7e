use super::*;
use std::time::Duration;

fn make_key(s: &str) -> CacheKey {
    CacheKey::try_from(s).unwrap()
}

fn entry(payload: &str, ttl: Option<Duration>) -> StoredEntry {
    StoredEntry::new(payload.to_string(), SystemTime::UNIX_EPOCH, ttl)
}

#[test]
fn test_set_get_remove() {
    let mut backend = SessionBackend::new(1024);
    let key = make_key("briefing_b1");

    backend.set(&key, &entry("draft", None)).unwrap();
    assert_eq!(backend.get(&key).unwrap(), Some(entry("draft", None)));
    assert_eq!(backend.used_bytes(), "briefing_b1".len() + "draft".len());

    backend.remove(&key).unwrap();
    assert_eq!(backend.get(&key).unwrap(), None);
    assert_eq!(backend.used_bytes(), 0);
    assert!(backend.is_empty());
}

#[test]
fn test_quota_exceeded() {
    let mut backend = SessionBackend::new(16);
    let key = make_key("k");

    let err = backend.set(&key, &entry(&"x".repeat(16), None)).unwrap_err();
    assert!(matches!(err, BackendError::QuotaExceeded { size: 17, max: 16 }));
    assert!(backend.is_empty());
}

#[test]
fn test_overwrite_counts_replacement_only() {
    let mut backend = SessionBackend::new(16);
    let key = make_key("k");

    backend.set(&key, &entry(&"x".repeat(15), None)).unwrap();
    // Replacing the 15-byte payload with another 15-byte payload fits.
    backend.set(&key, &entry(&"y".repeat(15), None)).unwrap();
    assert_eq!(backend.used_bytes(), 16);
    assert_eq!(backend.len(), 1);
}

#[test]
fn test_sweep_expired() {
    let mut backend = SessionBackend::new(1024);
    backend
        .set(&make_key("a"), &entry("1", Some(Duration::from_secs(1))))
        .unwrap();
    backend.set(&make_key("b"), &entry("2", None)).unwrap();

    let removed = backend
        .sweep_expired(SystemTime::UNIX_EPOCH + Duration::from_secs(1))
        .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(backend.len(), 1);
    assert_eq!(backend.used_bytes(), 2);
}
