use nutype::nutype;
use uuid::Uuid;

pub const MAX_PROJECT_ID_LENGTH: usize = 128;

/// Identifier of a project as assigned by the backend.
///
/// Any opaque string is accepted: UUIDs, short codes such as `P0001`,
/// preview codes such as `PREV-0001`, or anything else the admin created.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = MAX_PROJECT_ID_LENGTH),
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
        Display,
        Serialize,
        Deserialize,
    )
)]
pub struct ProjectId(String);

impl ProjectId {
    /// Shape of this id when it is one of the plain identifier formats.
    pub fn shape(&self) -> Option<IdentifierShape> {
        IdentifierShape::classify(self.as_str())
    }
}

/// Name of a service whose webhook endpoint is cached, e.g. `briefing`.
#[nutype(
    sanitize(trim, lowercase),
    validate(
        not_empty,
        len_char_max = 64,
        predicate = |s: &str| s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
    ),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        AsRef,
        Deref,
        TryFrom,
        Hash,
        Display,
        Serialize,
        Deserialize,
    )
)]
pub struct ServiceType(String);

/// Plain-text identifier formats that are used directly in preview URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierShape {
    /// Canonical hyphenated UUID.
    Uuid,
    /// `P` followed by at least four digits.
    ShortCode,
    /// `PREV-` followed by at least four digits.
    PreviewCode,
}

const MIN_CODE_DIGITS: usize = 4;

impl IdentifierShape {
    pub fn classify(value: &str) -> Option<Self> {
        if let Some(digits) = value.strip_prefix("PREV-") {
            return is_code_digits(digits).then_some(Self::PreviewCode);
        }
        if let Some(digits) = value.strip_prefix('P') {
            return is_code_digits(digits).then_some(Self::ShortCode);
        }
        // Only the 36-char hyphenated form; `Uuid::parse_str` also takes
        // simple, braced and urn forms.
        if value.len() == 36 && Uuid::parse_str(value).is_ok() {
            return Some(Self::Uuid);
        }
        None
    }

    /// True for the code formats that encoding passes through unchanged.
    pub fn is_code(self) -> bool {
        matches!(self, Self::ShortCode | Self::PreviewCode)
    }
}

fn is_code_digits(digits: &str) -> bool {
    digits.len() >= MIN_CODE_DIGITS && digits.bytes().all(|b| b.is_ascii_digit())
}
