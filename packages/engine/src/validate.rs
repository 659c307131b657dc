//! Whole-submission validation
//!
//! Checks a proposed category split against per-parcel conservation and
//! household-wide budget ceilings. Validation is all-or-nothing: the first
//! failed invariant rejects the entire submission with no partial acceptance.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::area::{Area, TOLERANCE_RAI};
use crate::error::ValidationError;
use crate::holding::{Ceilings, ParcelHolding};
use crate::submission::{AllocationSubmission, Category, MemberRef, NewMember};

/// One accepted allocation row, normalized onto the square-wa grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValidatedRow {
    pub parcel_id: i64,
    pub category: Category,
    pub area_rai: f64,
    pub member_ref: Option<MemberRef>,
}

/// An accepted submission, ready for transactional commit.
///
/// Only [`validate`] constructs this; the commit path can rely on every
/// invariant having been checked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedSplit {
    household_id: i64,
    rows: Vec<ValidatedRow>,
    new_members: Vec<NewMember>,
}

impl ValidatedSplit {
    pub fn household_id(&self) -> i64 {
        self.household_id
    }

    pub fn rows(&self) -> &[ValidatedRow] {
        &self.rows
    }

    pub fn new_members(&self) -> &[NewMember] {
        &self.new_members
    }

    /// True when every submitted row was dropped at the zero-area filter.
    /// Committing an empty split resets the household to no allocations.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Validate a proposed split for `household_id`.
///
/// `parcels` are the household's original parcels; `existing_member_ids` the
/// ids of its already-registered members. Rows with non-positive area are
/// dropped before validation, never rejected.
///
/// Every parcel named in the submission must be *fully* allocated within
/// tolerance, not merely kept under its surveyed area; the state-category
/// remainder is re-derived here rather than trusted from the caller.
pub fn validate(
    parcels: &[ParcelHolding],
    existing_member_ids: &[i64],
    ceilings: &Ceilings,
    submission: &AllocationSubmission,
) -> Result<ValidatedSplit, ValidationError> {
    let household_id = submission.household_id;

    // New-member definitions must be usable before anything references them
    let mut seen_indices = HashSet::new();
    for member in &submission.new_members {
        if let Some(reason) = member.rejection_reason() {
            return Err(ValidationError::InvalidMember {
                index: member.index,
                reason: reason.to_string(),
            });
        }
        if !seen_indices.insert(member.index) {
            return Err(ValidationError::InvalidMember {
                index: member.index,
                reason: "duplicate index".to_string(),
            });
        }
    }

    let parcel_areas: BTreeMap<i64, Area> =
        parcels.iter().map(|p| (p.parcel_id, p.area)).collect();

    // Zero/negative rows are a no-op; surviving rows snap to the sqwa grid.
    // Filtering runs after the snap so a sub-grid sliver cannot reach the
    // store as a zero-area row.
    let rows: Vec<ValidatedRow> = submission
        .allocations
        .iter()
        .map(|r| ValidatedRow {
            parcel_id: r.parcel_id,
            category: r.category,
            area_rai: Area::from_rai(r.area).to_rai(),
            member_ref: match r.category {
                Category::Heir => r.heir_member_ref,
                _ => None,
            },
        })
        .filter(|r| r.area_rai > 0.0)
        .collect();

    // Per-parcel conservation: never over the surveyed area, and with the
    // full-conservation check, never under it either
    let mut per_parcel: BTreeMap<i64, f64> = BTreeMap::new();
    for row in &rows {
        if !parcel_areas.contains_key(&row.parcel_id) {
            return Err(ValidationError::UnknownParcel {
                household_id,
                parcel_id: row.parcel_id,
            });
        }
        *per_parcel.entry(row.parcel_id).or_insert(0.0) += row.area_rai;
    }
    for (parcel_id, allocated_rai) in &per_parcel {
        let parcel_rai = parcel_areas[parcel_id].to_rai();
        if *allocated_rai > parcel_rai + TOLERANCE_RAI {
            return Err(ValidationError::ConservationViolation {
                parcel_id: *parcel_id,
                allocated_rai: *allocated_rai,
                parcel_rai,
            });
        }
        if *allocated_rai < parcel_rai - TOLERANCE_RAI {
            return Err(ValidationError::IncompleteAllocation {
                parcel_id: *parcel_id,
                allocated_rai: *allocated_rai,
                parcel_rai,
            });
        }
    }

    // Household-wide budget ceilings
    for (category, ceiling_rai) in [
        (Category::Owner, ceilings.owner_rai),
        (Category::Heir, ceilings.heir_rai),
    ] {
        let total_rai: f64 = rows
            .iter()
            .filter(|r| r.category == category)
            .map(|r| r.area_rai)
            .sum();
        if total_rai > ceiling_rai + TOLERANCE_RAI {
            return Err(ValidationError::BudgetExceeded {
                category,
                total_rai,
                ceiling_rai,
            });
        }
    }

    // Every heir row must name a member that exists or is being created
    let existing: HashSet<i64> = existing_member_ids.iter().copied().collect();
    for row in rows.iter().filter(|r| r.category == Category::Heir) {
        let resolvable = match row.member_ref {
            Some(MemberRef::Existing(id)) => existing.contains(&id),
            Some(MemberRef::New(index)) => seen_indices.contains(&index),
            None => false,
        };
        if !resolvable {
            return Err(ValidationError::UnresolvedHeir {
                parcel_id: row.parcel_id,
                member_ref: row.member_ref,
            });
        }
    }

    tracing::debug!(
        household_id,
        rows = rows.len(),
        new_members = submission.new_members.len(),
        "submission validated"
    );

    Ok(ValidatedSplit {
        household_id,
        rows,
        new_members: submission.new_members.clone(),
    })
}
