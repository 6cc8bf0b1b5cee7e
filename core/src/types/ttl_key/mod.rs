use crate::types::key::CacheKey;
use redb::TypeName;
use std::cmp::Ordering;
use std::time::{Duration, SystemTime};

/// Expiry index entry: orders by `expires_at`, then by key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlKey {
    pub expires_at: SystemTime,
    pub key: CacheKey,
}

const SECS_LEN: usize = 8;
const NANOS_LEN: usize = 4;

fn extract_duration(data: &[u8]) -> (Duration, &[u8]) {
    let Some((secs, data)) = data.split_first_chunk::<SECS_LEN>() else {
        return (Duration::ZERO, data);
    };
    let Some((nanos, data)) = data.split_first_chunk::<NANOS_LEN>() else {
        return (Duration::ZERO, data);
    };

    let since_epoch = Duration::new(u64::from_be_bytes(*secs), u32::from_be_bytes(*nanos));
    (since_epoch, data)
}

impl redb::Key for TtlKey {
    fn compare(data1: &[u8], data2: &[u8]) -> Ordering {
        let (data1_duration, data1) = extract_duration(data1);
        let (data2_duration, data2) = extract_duration(data2);

        data1_duration
            .cmp(&data2_duration)
            .then_with(|| <CacheKey as redb::Key>::compare(data1, data2))
    }
}

impl redb::Value for TtlKey {
    type SelfType<'a> = TtlKey;
    type AsBytes<'a> = Vec<u8>;

    fn fixed_width() -> Option<usize> {
        None
    }

    fn from_bytes<'a>(data: &'a [u8]) -> Self::SelfType<'a>
    where
        Self: 'a,
    {
        let (expires_at_since_epoch, data) = extract_duration(data);
        let key = <CacheKey as redb::Value>::from_bytes(data);

        TtlKey {
            expires_at: SystemTime::UNIX_EPOCH + expires_at_since_epoch,
            key,
        }
    }

    fn as_bytes<'a, 'b: 'a>(value: &'a Self::SelfType<'b>) -> Self::AsBytes<'a>
    where
        Self: 'b,
    {
        let since_epoch = value
            .expires_at
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        let key_bytes = <CacheKey as redb::Value>::as_bytes(&value.key);

        let mut bytes = Vec::with_capacity(SECS_LEN + NANOS_LEN + key_bytes.len());
        bytes.extend_from_slice(&since_epoch.as_secs().to_be_bytes());
        bytes.extend_from_slice(&since_epoch.subsec_nanos().to_be_bytes());
        bytes.extend_from_slice(key_bytes);
        bytes
    }

    fn type_name() -> TypeName {
        TypeName::new("harmonia::TtlKey")
    }
}
