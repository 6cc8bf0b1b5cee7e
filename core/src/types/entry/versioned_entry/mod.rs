use redb::TypeName;
pub use v1 as latest_entry;

pub mod v1;

pub trait EntryVariant {
    const VERSION: u8;
}

/// On-disk form of a cache entry: one version byte followed by postcard.
#[derive(Debug, Clone)]
pub enum VersionedEntry {
    V1(v1::Entry),
    /// Bytes that no known version can decode.
    Unreadable { version: Option<u8> },
}

impl VersionedEntry {
    pub fn latest(entry: latest_entry::Entry) -> Self {
        VersionedEntry::V1(entry)
    }

    /// Upgrades to the latest layout, or `None` if the bytes were unreadable.
    pub fn into_latest(self) -> Option<latest_entry::Entry> {
        match self {
            VersionedEntry::V1(entry) => Some(entry),
            VersionedEntry::Unreadable { .. } => None,
        }
    }
}

impl redb::Value for VersionedEntry {
    type SelfType<'a> = VersionedEntry;
    type AsBytes<'a> = Vec<u8>;

    fn fixed_width() -> Option<usize> {
        None
    }

    fn from_bytes<'a>(data: &'a [u8]) -> Self::SelfType<'a>
    where
        Self: 'a,
    {
        let Some((version, data)) = data.split_first() else {
            return VersionedEntry::Unreadable { version: None };
        };
        match *version {
            v1::Entry::VERSION => match postcard::from_bytes::<v1::Entry>(data) {
                Ok(entry) => VersionedEntry::V1(entry),
                Err(_) => VersionedEntry::Unreadable {
                    version: Some(*version),
                },
            },
            version => VersionedEntry::Unreadable {
                version: Some(version),
            },
        }
    }

    fn as_bytes<'a, 'b: 'a>(value: &'a Self::SelfType<'b>) -> Self::AsBytes<'a>
    where
        Self: 'b,
    {
        match value {
            VersionedEntry::V1(v1) => postcard::to_extend(v1, vec![v1::Entry::VERSION])
                .unwrap_or_else(|_| vec![v1::Entry::VERSION]),
            VersionedEntry::Unreadable { version } => version.iter().copied().collect(),
        }
    }

    fn type_name() -> TypeName {
        TypeName::new("harmonia::Entry")
    }
}

#[cfg(test)]
mod tests;
