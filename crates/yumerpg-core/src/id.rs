//! Stable 64-bit identifiers and the name hash that derives them.
//!
//! Elements and constructors are addressed by [`Id`]. Designers usually write
//! names; the name is folded into an id with [`long_hash`], which must stay
//! bit-for-bit identical across releases because save files store the
//! resulting numbers. Two distinct names that hash to the same id will merge
//! their Elements or Constructors, so near-duplicate names should be avoided
//! when authoring data.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest name (in UTF-16 code units) accepted by [`long_hash`].
pub const MAX_NAME_LEN: usize = 96;

/// Identifies an Element or a Constructor. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(pub i64);

impl Id {
    /// Sentinel for objects that were not built from an Element, such as
    /// [`ObjectArray`](crate::object::ObjectArray).
    pub const UNKNOWN: Id = Id(i64::MIN);

    /// Derive an id from a declared name.
    pub fn from_name(name: &str) -> Result<Id, NameError> {
        long_hash(name).map(Id)
    }

    pub fn is_unknown(self) -> bool {
        self == Self::UNKNOWN
    }
}

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Id(value)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            f.write_str("<unknown>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("name is {len} UTF-16 units long, the limit is {MAX_NAME_LEN}")]
    TooLong { len: usize },
}

/// Hash a name into a signed 64-bit value.
///
/// Works on UTF-16 code units, four at a time, then folds the 1-3 trailing
/// units one by one. All arithmetic wraps.
pub fn long_hash(name: &str) -> Result<i64, NameError> {
    let units: Vec<u16> = name.encode_utf16().collect();
    let len = units.len();
    if len > MAX_NAME_LEN {
        return Err(NameError::TooLong { len });
    }

    let end4 = len & !3;
    let mut result = len as i64;
    for chunk in units[..end4].chunks_exact(4) {
        result = result
            .wrapping_mul(67_503_105)
            .wrapping_add(i64::from(chunk[0]) * 16_974_593)
            .wrapping_add(i64::from(chunk[1]) * 66_049)
            .wrapping_add(i64::from(chunk[2]) * 257)
            .wrapping_add(i64::from(chunk[3]));
    }
    for &unit in &units[end4..] {
        result = result.wrapping_mul(257).wrapping_add(i64::from(unit));
    }

    Ok(result.wrapping_add(result.wrapping_shl((len & 31) as u32)))
}
