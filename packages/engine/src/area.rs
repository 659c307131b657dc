//! Mixed-radix land-area arithmetic (rai / ngan / square wa)
//!
//! The statutory measurement system is three-tier with a fixed radix:
//! 1 rai = 4 ngan, 1 ngan = 100 square wa. Areas are recorded in whole
//! components and compared in decimal rai.

use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::error::AreaError;

/// 1 rai = 4 ngan
pub const NGAN_PER_RAI: u32 = 4;

/// 1 ngan = 100 square wa
pub const SQWA_PER_NGAN: u32 = 100;

/// Conservation tolerance in decimal rai.
///
/// Discrepancies at or below this are treated as fully allocated and
/// generate no remainder.
pub const TOLERANCE_RAI: f64 = 0.001;

/// A land area in the rai / ngan / square-wa system.
///
/// Always held normalized: `ngan < 4`, `sqwa < 100`. Construct through
/// [`Area::new`] or [`Area::from_rai`], which carry overflowing components
/// upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Area {
    pub rai: u32,
    pub ngan: u32,
    pub sqwa: u32,
}

impl Area {
    pub const ZERO: Area = Area {
        rai: 0,
        ngan: 0,
        sqwa: 0,
    };

    /// Build an area from raw components, carrying square wa into ngan and
    /// ngan into rai. Normalizing an already-normalized value is a no-op.
    pub fn new(rai: u32, ngan: u32, sqwa: u32) -> Self {
        let ngan = ngan + sqwa / SQWA_PER_NGAN;
        let sqwa = sqwa % SQWA_PER_NGAN;
        let rai = rai + ngan / NGAN_PER_RAI;
        let ngan = ngan % NGAN_PER_RAI;
        Area { rai, ngan, sqwa }
    }

    /// Decimal rai: `rai + ngan/4 + sqwa/400`
    pub fn to_rai(&self) -> f64 {
        f64::from(self.rai) + f64::from(self.ngan) / 4.0 + f64::from(self.sqwa) / 400.0
    }

    /// Convert decimal rai back to components.
    ///
    /// Whole rai are taken first; the remaining fraction yields ngan, and its
    /// remainder rounds to square wa on the 1/400-rai grid. Non-positive
    /// input clamps to zero.
    pub fn from_rai(value: f64) -> Self {
        if value <= 0.0 {
            return Area::ZERO;
        }
        let rai = value.floor();
        let ngan_part = (value - rai) * f64::from(NGAN_PER_RAI);
        let ngan = ngan_part.floor();
        let sqwa = ((ngan_part - ngan) * f64::from(SQWA_PER_NGAN)).round();
        Area::new(rai as u32, ngan as u32, sqwa as u32)
    }

    pub fn is_zero(&self) -> bool {
        *self == Area::ZERO
    }

    /// Subtract, clamping to zero within the conservation tolerance.
    ///
    /// Errors with [`AreaError::Underflow`] when the subtrahend exceeds the
    /// minuend by more than [`TOLERANCE_RAI`].
    pub fn checked_sub(&self, other: &Area) -> Result<Area, AreaError> {
        let diff = self.to_rai() - other.to_rai();
        if diff < -TOLERANCE_RAI {
            return Err(AreaError::Underflow {
                minuend_rai: self.to_rai(),
                subtrahend_rai: other.to_rai(),
            });
        }
        Ok(Area::from_rai(diff.max(0.0)))
    }
}

impl Add for Area {
    type Output = Area;

    fn add(self, other: Area) -> Area {
        Area::from_rai(self.to_rai() + other.to_rai())
    }
}

impl fmt::Display for Area {
    /// Record notation, e.g. `25-0-0`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.rai, self.ngan, self.sqwa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_carries_components() {
        // 150 sqwa -> 1 ngan + 50; 6 ngan -> 1 rai + 2
        let area = Area::new(0, 5, 150);
        assert_eq!(
            area,
            Area {
                rai: 1,
                ngan: 2,
                sqwa: 50
            }
        );
    }

    #[test]
    fn test_normalize_idempotent() {
        for (rai, ngan, sqwa) in [(0, 0, 0), (0, 5, 150), (3, 17, 999), (25, 0, 0)] {
            let once = Area::new(rai, ngan, sqwa);
            let twice = Area::new(once.rai, once.ngan, once.sqwa);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_to_rai() {
        assert_eq!(Area::new(20, 0, 0).to_rai(), 20.0);
        assert_eq!(Area::new(1, 2, 50).to_rai(), 1.625);
        assert_eq!(Area::new(0, 0, 1).to_rai(), 0.0025);
    }

    #[test]
    fn test_from_rai() {
        assert_eq!(Area::from_rai(5.0), Area::new(5, 0, 0));
        assert_eq!(Area::from_rai(1.625), Area::new(1, 2, 50));
        assert_eq!(Area::from_rai(0.0), Area::ZERO);
        assert_eq!(Area::from_rai(-3.0), Area::ZERO);
    }

    #[test]
    fn test_from_rai_carries_rounded_sqwa() {
        // 9.999 rai rounds onto the sqwa grid as exactly 10 rai
        assert_eq!(Area::from_rai(9.999), Area::new(10, 0, 0));
    }

    #[test]
    fn test_round_trip() {
        for (rai, ngan, sqwa) in [(0, 0, 0), (1, 2, 50), (25, 3, 99), (40, 0, 1)] {
            let area = Area::new(rai, ngan, sqwa);
            assert_eq!(Area::from_rai(area.to_rai()), area);
        }
    }

    #[test]
    fn test_add() {
        let a = Area::new(15, 0, 0);
        let b = Area::new(10, 2, 50);
        assert_eq!(a + b, Area::new(25, 2, 50));
    }

    #[test]
    fn test_checked_sub() {
        let a = Area::new(25, 0, 0);
        let b = Area::new(20, 0, 0);
        assert_eq!(a.checked_sub(&b), Ok(Area::new(5, 0, 0)));
    }

    #[test]
    fn test_checked_sub_clamps_within_tolerance() {
        let a = Area::new(10, 0, 0);
        let b = Area::from_rai(10.0005);
        // 10.0005 normalizes back onto the grid; difference stays within tolerance
        assert_eq!(a.checked_sub(&b), Ok(Area::ZERO));
    }

    #[test]
    fn test_checked_sub_underflow() {
        let a = Area::new(5, 0, 0);
        let b = Area::new(7, 2, 0);
        assert_eq!(
            a.checked_sub(&b),
            Err(AreaError::Underflow {
                minuend_rai: 5.0,
                subtrahend_rai: 7.5,
            })
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Area::new(25, 0, 0).to_string(), "25-0-0");
        assert_eq!(Area::new(0, 5, 150).to_string(), "1-2-50");
    }

    #[test]
    fn test_serde_round_trip() {
        let area = Area::new(12, 3, 45);
        let json = serde_json::to_string(&area).unwrap();
        assert_eq!(json, r#"{"rai":12,"ngan":3,"sqwa":45}"#);
        let parsed: Area = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, area);
    }
}
