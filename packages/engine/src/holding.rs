//! Aggregate holding summary across a household's original parcels

use serde::{Deserialize, Serialize};

use crate::area::Area;

/// Statutory retention ceilings in decimal rai, per category and household-wide
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ceilings {
    pub owner_rai: f64,
    pub heir_rai: f64,
}

impl Ceilings {
    pub fn new(owner_rai: f64, heir_rai: f64) -> Self {
        Self {
            owner_rai,
            heir_rai,
        }
    }

    /// Combined owner + heir ceiling; area beyond this is necessarily
    /// state-category.
    pub fn combined_rai(&self) -> f64 {
        self.owner_rai + self.heir_rai
    }
}

impl Default for Ceilings {
    fn default() -> Self {
        Self {
            owner_rai: 20.0,
            heir_rai: 20.0,
        }
    }
}

/// Where a household's aggregate stands against the retention ceilings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingStatus {
    /// Total at or under the owner ceiling; eligible for simple approval
    WithinCeiling,
    /// Over the owner ceiling but coverable by owner + heir budgets
    NeedsSplit,
    /// Beyond the combined ceiling; the excess is a state reclamation claim
    ExcessStateClaim,
}

/// A parcel as the aggregator and validator see it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParcelHolding {
    pub parcel_id: i64,
    pub area: Area,
}

/// Aggregate of a household's original parcels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingSummary {
    pub total: Area,
    pub total_rai: f64,
    pub parcel_count: usize,
    pub status: HoldingStatus,
}

/// Sum a household's original parcels and classify the total.
///
/// Pure; informs and validates only. Allocation rows are always submitted
/// explicitly by the caller, never generated from this summary.
pub fn summarize_holding(parcels: &[ParcelHolding], ceilings: &Ceilings) -> HoldingSummary {
    let mut rai: u32 = 0;
    let mut ngan: u32 = 0;
    let mut sqwa: u32 = 0;
    for p in parcels {
        rai += p.area.rai;
        ngan += p.area.ngan;
        sqwa += p.area.sqwa;
    }
    let total = Area::new(rai, ngan, sqwa);
    let total_rai = (total.to_rai() * 10_000.0).round() / 10_000.0;

    let status = if total_rai <= ceilings.owner_rai {
        HoldingStatus::WithinCeiling
    } else if total_rai <= ceilings.combined_rai() {
        HoldingStatus::NeedsSplit
    } else {
        HoldingStatus::ExcessStateClaim
    };

    HoldingSummary {
        total,
        total_rai,
        parcel_count: parcels.len(),
        status,
    }
}
