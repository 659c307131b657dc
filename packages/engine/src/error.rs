//! Error types for the allocation engine

use thiserror::Error;

use crate::submission::{Category, MemberRef};

/// Errors from mixed-radix area arithmetic
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AreaError {
    /// Subtraction went negative beyond the conservation tolerance
    #[error("area underflow: cannot subtract {subtrahend_rai} rai from {minuend_rai} rai")]
    Underflow {
        minuend_rai: f64,
        subtrahend_rai: f64,
    },
}

/// Errors rejecting an allocation submission.
///
/// Any single error is terminal for the whole submission; the caller must
/// correct and resubmit the full set.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A row references a parcel the household does not hold
    #[error("parcel {parcel_id} does not belong to household {household_id}")]
    UnknownParcel { household_id: i64, parcel_id: i64 },

    /// A parcel's proposed rows exceed its surveyed area
    #[error(
        "parcel {parcel_id} over-allocated: {allocated_rai} rai proposed against {parcel_rai} rai surveyed"
    )]
    ConservationViolation {
        parcel_id: i64,
        allocated_rai: f64,
        parcel_rai: f64,
    },

    /// A parcel's proposed rows leave part of its area unaccounted for
    #[error(
        "parcel {parcel_id} under-allocated: {allocated_rai} rai proposed against {parcel_rai} rai surveyed"
    )]
    IncompleteAllocation {
        parcel_id: i64,
        allocated_rai: f64,
        parcel_rai: f64,
    },

    /// A household-wide category total exceeds its statutory ceiling
    #[error("{category} total {total_rai} rai exceeds the {ceiling_rai} rai ceiling")]
    BudgetExceeded {
        category: Category,
        total_rai: f64,
        ceiling_rai: f64,
    },

    /// A heir row carries no resolvable member reference
    #[error("heir allocation on parcel {parcel_id} has no resolvable member reference")]
    UnresolvedHeir {
        parcel_id: i64,
        member_ref: Option<MemberRef>,
    },

    /// A submitted new-member definition is unusable
    #[error("new member {index}: {reason}")]
    InvalidMember { index: u32, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underflow_display() {
        let err = AreaError::Underflow {
            minuend_rai: 5.0,
            subtrahend_rai: 7.5,
        };
        assert_eq!(
            err.to_string(),
            "area underflow: cannot subtract 7.5 rai from 5 rai"
        );
    }

    #[test]
    fn test_budget_exceeded_display() {
        let err = ValidationError::BudgetExceeded {
            category: Category::Owner,
            total_rai: 21.0,
            ceiling_rai: 20.0,
        };
        assert_eq!(
            err.to_string(),
            "owner total 21 rai exceeds the 20 rai ceiling"
        );
    }

    #[test]
    fn test_unresolved_heir_display() {
        let err = ValidationError::UnresolvedHeir {
            parcel_id: 9,
            member_ref: None,
        };
        assert_eq!(
            err.to_string(),
            "heir allocation on parcel 9 has no resolvable member reference"
        );
    }
}
