//! Landtenure Engine
//!
//! Pure allocation logic for a statutory land-tenure program where a
//! household's aggregate holding is capped by a retention ceiling. This
//! library provides:
//! - Mixed-radix area arithmetic (rai / ngan / square wa)
//! - Aggregate holding summaries against the statutory ceilings
//! - Whole-submission validation of a proposed category split
//!
//! # Example
//!
//! ```
//! use landtenure_engine::{
//!     summarize_holding, validate, Area, AllocationSubmission, Ceilings,
//!     HoldingStatus, ParcelHolding,
//! };
//!
//! let parcels = vec![ParcelHolding {
//!     parcel_id: 1,
//!     area: Area::new(25, 0, 0),
//! }];
//! let summary = summarize_holding(&parcels, &Ceilings::default());
//! assert_eq!(summary.status, HoldingStatus::NeedsSplit);
//!
//! let submission: AllocationSubmission = serde_json::from_str(
//!     r#"{
//!         "household_id": 1,
//!         "allocations": [
//!             {"parcel_id": 1, "category": "owner", "area": 20.0},
//!             {"parcel_id": 1, "category": "heir", "area": 5.0, "heir_member_ref": 7}
//!         ]
//!     }"#,
//! )
//! .unwrap();
//! let split = validate(&parcels, &[7], &Ceilings::default(), &submission).unwrap();
//! assert_eq!(split.rows().len(), 2);
//! ```

pub mod area;
pub mod error;
pub mod holding;
pub mod submission;
pub mod validate;

// Re-export commonly used items
pub use area::{Area, NGAN_PER_RAI, SQWA_PER_NGAN, TOLERANCE_RAI};
pub use error::{AreaError, ValidationError};
pub use holding::{summarize_holding, Ceilings, HoldingStatus, HoldingSummary, ParcelHolding};
pub use submission::{AllocationRequest, AllocationSubmission, Category, MemberRef, NewMember};
pub use validate::{validate, ValidatedRow, ValidatedSplit};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
