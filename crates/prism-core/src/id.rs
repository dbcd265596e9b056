//! Identity types for PRISM
//!
//! Remote entities carry a globally unique opaque identifier. The
//! synchronization layer refers to them through a process-local dense
//! index instead, which is what update events are keyed by.

use std::fmt;

use crate::{PrismError, PrismResult};

/// Strip an optional `0x`/`0X` prefix from a hex string
pub(crate) fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Entity identifier - opaque immutable byte sequence assigned remotely
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(Box<[u8]>);

#[allow(clippy::len_without_is_empty)]
impl EntityId {
    /// Minimum number of bytes; the visual identity reads the first three
    pub const MIN_LEN: usize = 3;

    pub fn new(bytes: impl Into<Box<[u8]>>) -> PrismResult<Self> {
        let bytes = bytes.into();
        if bytes.len() < Self::MIN_LEN {
            return Err(PrismError::IdentifierTooShort {
                expected: Self::MIN_LEN,
                actual: bytes.len(),
            });
        }
        Ok(EntityId(bytes))
    }

    /// Parse the canonical `0x`-prefixed hex form (prefix optional)
    pub fn from_hex(s: &str) -> PrismResult<Self> {
        let bytes = hex::decode(strip_hex_prefix(s))?;
        Self::new(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Three leading bytes, always present by construction
    #[inline]
    pub fn head(&self) -> [u8; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    /// Byte length, never below `MIN_LEN`
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl TryFrom<&str> for EntityId {
    type Error = PrismError;

    fn try_from(s: &str) -> PrismResult<Self> {
        Self::from_hex(s)
    }
}

/// Local dense index - process-local handle for an entity
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EntityIndex(pub u32);

impl EntityIndex {
    #[inline]
    pub fn new(index: u32) -> Self {
        EntityIndex(index)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for EntityIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Index({})", self.0)
    }
}

impl fmt::Display for EntityIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for EntityIndex {
    fn from(index: u32) -> Self {
        EntityIndex(index)
    }
}
