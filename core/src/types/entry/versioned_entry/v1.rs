use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use super::EntryVariant;

#[cfg_attr(test, derive(Eq, PartialEq))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub payload: String,
    pub written_at: SystemTime,
    pub expires_at: Option<SystemTime>,
}

impl EntryVariant for Entry {
    const VERSION: u8 = 1;
}
