use super::*;
use std::time::{Duration, SystemTime};

#[test]
fn entry_v1_serialization() {
    let now = SystemTime::now();
    let original = v1::Entry {
        payload: r#"{"comments":"louder chorus"}"#.to_string(),
        written_at: now,
        expires_at: Some(now + Duration::from_secs(3600)),
    };

    let versioned = VersionedEntry::latest(original.clone());
    let bytes = <VersionedEntry as redb::Value>::as_bytes(&versioned);
    assert_eq!(bytes[0], v1::Entry::VERSION);

    let decoded = <VersionedEntry as redb::Value>::from_bytes(&bytes);
    assert_eq!(decoded.into_latest(), Some(original));
}

#[test]
fn unknown_version_is_unreadable() {
    let decoded = <VersionedEntry as redb::Value>::from_bytes(&[99, 1, 2, 3]);
    assert!(matches!(
        decoded,
        VersionedEntry::Unreadable { version: Some(99) }
    ));
}

#[test]
fn empty_bytes_are_unreadable() {
    let decoded = <VersionedEntry as redb::Value>::from_bytes(&[]);
    assert!(decoded.into_latest().is_none());
}

#[test]
fn truncated_v1_is_unreadable() {
    let decoded = <VersionedEntry as redb::Value>::from_bytes(&[v1::Entry::VERSION, 200]);
    assert!(matches!(
        decoded,
        VersionedEntry::Unreadable { version: Some(1) }
    ));
}
