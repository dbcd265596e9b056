//! Commands submitted to the remote ledger

use std::ops::RangeInclusive;

use crate::{Formula, Magnitude};

/// Request the remote ledger to create a new formula entity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CreateFormula {
    pub x: u64,
    pub y: u64,
}

impl CreateFormula {
    /// Remote system the command is addressed to
    pub const SYSTEM: &'static str = "system.CreateFormula";

    /// Largest exactly representable integer of an IEEE double (2^53 - 1)
    pub const X_MAX: u64 = (1 << 53) - 1;

    /// 2^32 - 1
    pub const Y_MAX: u64 = u32::MAX as u64;

    pub fn x_range() -> RangeInclusive<u64> {
        0..=Self::X_MAX
    }

    pub fn y_range() -> RangeInclusive<u64> {
        0..=Self::Y_MAX
    }

    /// Are both operands inside their ranges?
    pub fn is_valid(&self) -> bool {
        Self::x_range().contains(&self.x) && Self::y_range().contains(&self.y)
    }

    /// The formula value the ledger stores for this command
    pub fn to_formula(&self) -> Formula {
        Formula {
            x: Magnitude::from_u64(self.x),
            y: Magnitude::from_u64(self.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert_eq!(CreateFormula::X_MAX, 9_007_199_254_740_991);
        assert_eq!(CreateFormula::Y_MAX, 4_294_967_295);
        assert!(CreateFormula { x: CreateFormula::X_MAX, y: CreateFormula::Y_MAX }.is_valid());
        assert!(!CreateFormula { x: CreateFormula::X_MAX + 1, y: 0 }.is_valid());
        assert!(!CreateFormula { x: 0, y: CreateFormula::Y_MAX + 1 }.is_valid());
    }

    #[test]
    fn test_to_formula() {
        let formula = CreateFormula { x: 0x0105, y: 2 }.to_formula();
        assert_eq!(formula.x.as_be_bytes(), &[0x01, 0x05]);
        assert_eq!(formula.y.as_be_bytes(), &[0x02]);
    }
}
