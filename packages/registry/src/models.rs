use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use landtenure_engine::{Area, Category, ParcelHolding};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "verification_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Unverified,
    Verified,
}

/// Category vocabulary shared by allocation rows and the per-parcel summary
/// tag. Rows only ever carry `Owner`/`Heir`/`State`; `Split` and
/// `Unallocated` exist for the summary tag on parcels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "allocation_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AllocationCategory {
    Owner,
    Heir,
    State,
    Split,
    Unallocated,
}

impl From<Category> for AllocationCategory {
    fn from(category: Category) -> Self {
        match category {
            Category::Owner => AllocationCategory::Owner,
            Category::Heir => AllocationCategory::Heir,
            Category::State => AllocationCategory::State,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "parcel_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ParcelStatus {
    Surveyed,
    PendingReview,
    TemporaryPermit,
    MustRelocate,
    Disputed,
}

/// Queue filter for households over the retention ceiling
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QueueFilter {
    /// Everything over the owner ceiling
    #[default]
    All,
    /// Over the owner ceiling but within the combined ceiling
    NeedsSplit,
    /// Beyond the combined ceiling
    ExcessStateClaim,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Household {
    pub id: i64,
    pub national_id: String,
    pub prefix: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub verification_status: VerificationStatus,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct HouseholdMember {
    pub id: i64,
    pub household_id: i64,
    pub prefix: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub national_id: Option<String>,
    pub relationship: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Parcel {
    pub id: i64,
    pub code: String,
    /// Digit-prefixed survey number; derived parcels always carry one
    pub survey_no: Option<i64>,
    pub household_id: i64,
    /// Set only on derived parcels, referencing the original parcel
    pub parent_parcel_id: Option<i64>,
    pub allocation_category: AllocationCategory,
    pub area_rai: i32,
    pub area_ngan: i32,
    pub area_sqwa: i32,
    pub park_name: Option<String>,
    pub zone: Option<String>,
    pub land_use: Option<String>,
    pub village: Option<String>,
    pub province: Option<String>,
    pub status: ParcelStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Parcel {
    pub fn area(&self) -> Area {
        Area::new(
            self.area_rai.max(0) as u32,
            self.area_ngan.max(0) as u32,
            self.area_sqwa.max(0) as u32,
        )
    }

    pub fn holding(&self) -> ParcelHolding {
        ParcelHolding {
            parcel_id: self.id,
            area: self.area(),
        }
    }
}

/// Committed allocation row joined with the receiving member, for display
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AllocationWithMember {
    pub id: i64,
    pub parcel_id: i64,
    pub household_id: i64,
    pub category: AllocationCategory,
    pub area_rai: f64,
    pub member_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub member_prefix: Option<String>,
    pub member_first_name: Option<String>,
    pub member_last_name: Option<String>,
    pub member_relationship: Option<String>,
}

/// One entry in the subdivision queue: a household whose aggregate exceeds
/// the owner ceiling
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct QueueEntry {
    pub household_id: i64,
    pub national_id: String,
    pub prefix: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub parcel_count: i64,
    pub total_rai: f64,
    pub derived_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VerificationStats {
    pub total: i64,
    pub verified: i64,
    pub pending: i64,
}

/// A derived parcel created during a commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedParcelRef {
    pub parcel_id: i64,
    pub code: String,
    pub survey_no: i64,
    pub category: AllocationCategory,
    pub area_rai: f64,
}

/// Outcome of a successful commit or simple approval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitSummary {
    pub household_id: i64,
    pub verification_status: VerificationStatus,
    pub allocation_rows: usize,
    pub derived_parcels: Vec<DerivedParcelRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_filter_from_str() {
        use std::str::FromStr;
        assert_eq!(QueueFilter::from_str("all"), Ok(QueueFilter::All));
        assert_eq!(
            QueueFilter::from_str("needs_split"),
            Ok(QueueFilter::NeedsSplit)
        );
        assert_eq!(
            QueueFilter::from_str("excess_state_claim"),
            Ok(QueueFilter::ExcessStateClaim)
        );
        assert!(QueueFilter::from_str("over9000").is_err());
    }

    #[test]
    fn test_category_from_engine() {
        assert_eq!(
            AllocationCategory::from(Category::State),
            AllocationCategory::State
        );
        assert_eq!(
            AllocationCategory::from(Category::Owner),
            AllocationCategory::Owner
        );
    }
}
