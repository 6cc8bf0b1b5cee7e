use crate::types::project::{ProjectId, ServiceType};
use nutype::nutype;
use redb::TypeName;
use std::cmp::Ordering;

pub const MAX_KEY_LENGTH: usize = 256;

#[nutype(
    new_unchecked,
    sanitize(trim),
    validate(not_empty, len_char_max = MAX_KEY_LENGTH),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        AsRef,
        Deref,
        TryFrom,
        Into,
        Hash,
        Borrow,
        Display,
        Serialize,
        Deserialize,
    )
)]
pub struct CacheKey(String);

/// Namespaced keys used by the portal.
impl CacheKey {
    pub fn feedback(project_id: &ProjectId) -> Self {
        // Project ids are trimmed, non-empty and at most 128 chars.
        unsafe { Self::new_unchecked(format!("feedback_{}", project_id.as_str())) }
    }

    pub fn briefing(briefing_id: &str) -> Result<Self, CacheKeyError> {
        let briefing_id = briefing_id.trim();
        if briefing_id.is_empty() {
            return Err(CacheKeyError::NotEmptyViolated);
        }
        Self::try_new(format!("briefing_{briefing_id}"))
    }

    pub fn webhook_url(service: &ServiceType) -> Self {
        // Service types are trimmed, non-empty and at most 64 chars.
        unsafe { Self::new_unchecked(format!("{}_webhookUrl", service.as_str())) }
    }

    pub fn utm_params() -> Self {
        unsafe { Self::new_unchecked("utm_params".to_string()) }
    }

    pub fn auth_hint() -> Self {
        unsafe { Self::new_unchecked("auth_hint".to_string()) }
    }
}

impl redb::Key for CacheKey {
    fn compare(data1: &[u8], data2: &[u8]) -> Ordering {
        // Byte order of UTF-8 matches `str` ordering.
        data1.cmp(data2)
    }
}

impl redb::Value for CacheKey {
    type SelfType<'a> = Self;
    type AsBytes<'a> = &'a [u8];

    fn fixed_width() -> Option<usize> {
        None
    }

    fn from_bytes<'a>(data: &'a [u8]) -> Self::SelfType<'a>
    where
        Self: 'a,
    {
        // Only keys that passed validation are ever written.
        unsafe { Self::new_unchecked(String::from_utf8_lossy(data).into_owned()) }
    }

    fn as_bytes<'a, 'b: 'a>(value: &'a Self::SelfType<'b>) -> Self::AsBytes<'a>
    where
        Self: 'b,
    {
        value.as_bytes()
    }

    fn type_name() -> TypeName {
        TypeName::new("harmonia::CacheKey")
    }
}

#[cfg(test)]
mod tests;
