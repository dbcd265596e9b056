//! Attribute definitions
//!
//! Attributes are the per-entity state synchronized from the remote ledger.
//! Exactly two kinds exist: a position and a formula. An update either
//! carries a value (set) or carries nothing (clear).

use std::fmt;

use bytes::Bytes;

use crate::id::strip_hex_prefix;
use crate::{EntityIndex, PrismResult};

/// Attribute kind classification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AttributeKind {
    Position = 0x01,
    Formula = 0x02,
}

impl AttributeKind {
    pub const ALL: [AttributeKind; 2] = [AttributeKind::Position, AttributeKind::Formula];

    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x01 => Some(AttributeKind::Position),
            0x02 => Some(AttributeKind::Formula),
            _ => None,
        }
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Stable attribute name
    pub fn name(self) -> &'static str {
        match self {
            AttributeKind::Position => "Position",
            AttributeKind::Formula => "Formula",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Big unsigned integer of arbitrary width, kept as big-endian bytes.
///
/// Leading zero bytes given to [`Magnitude::from_be_bytes`] are preserved;
/// every byte is a polynomial coefficient when the value is displayed.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Magnitude(Bytes);

impl Magnitude {
    /// Zero, encoded as a single zero byte
    pub fn zero() -> Self {
        Magnitude(Bytes::from_static(&[0]))
    }

    /// Take big-endian bytes verbatim; empty input becomes zero
    pub fn from_be_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Self::zero();
        }
        Magnitude(bytes)
    }

    /// Minimal big-endian encoding of a u128
    pub fn from_u128(value: u128) -> Self {
        let raw = value.to_be_bytes();
        let skip = raw.iter().take_while(|b| **b == 0).count();
        Self::from_be_bytes(raw[skip..].to_vec())
    }

    #[inline]
    pub fn from_u64(value: u64) -> Self {
        Self::from_u128(value as u128)
    }

    /// Parse a hex string, `0x` prefix optional. Odd digit counts are
    /// left-padded with a zero nibble.
    pub fn from_hex(s: &str) -> PrismResult<Self> {
        let digits = strip_hex_prefix(s);
        let bytes = if digits.len() % 2 == 1 {
            hex::decode(format!("0{}", digits))?
        } else {
            hex::decode(digits)?
        };
        Ok(Self::from_be_bytes(bytes))
    }

    #[inline]
    pub fn as_be_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of bytes, i.e. number of coefficients
    #[inline]
    pub fn width(&self) -> usize {
        self.0.len()
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl Default for Magnitude {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<u64> for Magnitude {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl From<u32> for Magnitude {
    fn from(value: u32) -> Self {
        Self::from_u64(value as u64)
    }
}

impl fmt::Debug for Magnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Magnitude({})", self)
    }
}

impl fmt::Display for Magnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

/// Position attribute value, in pixels
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }
}

/// Formula attribute value - two packed polynomials
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Formula {
    pub x: Magnitude,
    pub y: Magnitude,
}

impl Formula {
    pub fn new(x: impl Into<Magnitude>, y: impl Into<Magnitude>) -> Self {
        Formula {
            x: x.into(),
            y: y.into(),
        }
    }
}

/// Single attribute update for one entity
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeUpdate<T> {
    pub entity: EntityIndex,
    /// `None` clears the attribute
    pub value: Option<T>,
}

impl<T> AttributeUpdate<T> {
    pub fn set(entity: EntityIndex, value: T) -> Self {
        AttributeUpdate {
            entity,
            value: Some(value),
        }
    }

    pub fn clear(entity: EntityIndex) -> Self {
        AttributeUpdate {
            entity,
            value: None,
        }
    }
}

/// Update tagged by attribute kind
#[derive(Clone, Debug, PartialEq)]
pub enum Update {
    Position(AttributeUpdate<Position>),
    Formula(AttributeUpdate<Formula>),
}

impl Update {
    pub fn entity(&self) -> EntityIndex {
        match self {
            Update::Position(u) => u.entity,
            Update::Formula(u) => u.entity,
        }
    }

    pub fn kind(&self) -> AttributeKind {
        match self {
            Update::Position(_) => AttributeKind::Position,
            Update::Formula(_) => AttributeKind::Formula,
        }
    }

    /// Does this update clear its attribute?
    pub fn is_clear(&self) -> bool {
        match self {
            Update::Position(u) => u.value.is_none(),
            Update::Formula(u) => u.value.is_none(),
        }
    }
}

impl From<AttributeUpdate<Position>> for Update {
    fn from(update: AttributeUpdate<Position>) -> Self {
        Update::Position(update)
    }
}

impl From<AttributeUpdate<Formula>> for Update {
    fn from(update: AttributeUpdate<Formula>) -> Self {
        Update::Formula(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_kind_bytes() {
        for kind in AttributeKind::ALL {
            assert_eq!(AttributeKind::from_byte(kind.to_byte()), Some(kind));
        }
        assert_eq!(AttributeKind::from_byte(0x7f), None);
    }

    #[test]
    fn test_magnitude_minimal_encoding() {
        assert_eq!(Magnitude::from_u64(0).as_be_bytes(), &[0]);
        assert_eq!(Magnitude::from_u64(0x0105).as_be_bytes(), &[0x01, 0x05]);
        assert_eq!(Magnitude::from(u32::MAX).width(), 4);
        assert_eq!(Magnitude::from_u128(1 << 64).width(), 9);
    }

    #[test]
    fn test_magnitude_keeps_leading_zeros() {
        let m = Magnitude::from_be_bytes(vec![0x00, 0x02]);
        assert_eq!(m.as_be_bytes(), &[0x00, 0x02]);
        assert!(!m.is_zero());
        assert!(Magnitude::from_be_bytes(Vec::new()).is_zero());
    }

    #[test]
    fn test_magnitude_hex() {
        let m = Magnitude::from_hex("0x105").unwrap();
        assert_eq!(m.as_be_bytes(), &[0x01, 0x05]);
        assert_eq!(m.to_string(), "0x0105");
        assert!(Magnitude::from_hex("0xg1").is_err());
    }

    #[test]
    fn test_update_accessors() {
        let update: Update = AttributeUpdate::set(EntityIndex(3), Position::new(1.0, 2.0)).into();
        assert_eq!(update.entity(), EntityIndex(3));
        assert_eq!(update.kind(), AttributeKind::Position);
        assert!(!update.is_clear());

        let cleared: Update = AttributeUpdate::<Formula>::clear(EntityIndex(4)).into();
        assert_eq!(cleared.kind(), AttributeKind::Formula);
        assert!(cleared.is_clear());
    }
}
