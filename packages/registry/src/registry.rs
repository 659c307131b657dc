//! Read paths over the registry: household lookup, the subdivision queue,
//! committed splits, and verification statistics.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use landtenure_engine::{summarize_holding, Ceilings, HoldingSummary, NewMember, ValidationError};

use crate::error::{RegistryError, Result};
use crate::models::{
    AllocationWithMember, Household, HouseholdMember, Parcel, QueueEntry, QueueFilter,
    VerificationStats,
};

/// A household with its parcels, members, and computed holding summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseholdDetail {
    pub household: Household,
    /// Originally-surveyed parcels held by the household
    pub parcels: Vec<Parcel>,
    /// Derived parcels split off this household's originals
    pub derived: Vec<Parcel>,
    pub members: Vec<HouseholdMember>,
    pub summary: HoldingSummary,
}

/// Look a household up by its national id, the verification workflow's entry
/// point.
pub async fn find_household_by_national_id(
    pool: &PgPool,
    ceilings: &Ceilings,
    national_id: &str,
) -> Result<HouseholdDetail> {
    let household =
        sqlx::query_as::<_, Household>(r#"SELECT * FROM households WHERE national_id = $1"#)
            .bind(national_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| RegistryError::HouseholdNotFound(national_id.to_string()))?;

    household_detail(pool, ceilings, household).await
}

/// Look a household up by id.
pub async fn get_household(
    pool: &PgPool,
    ceilings: &Ceilings,
    household_id: i64,
) -> Result<HouseholdDetail> {
    let household = sqlx::query_as::<_, Household>(r#"SELECT * FROM households WHERE id = $1"#)
        .bind(household_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| RegistryError::HouseholdNotFound(household_id.to_string()))?;

    household_detail(pool, ceilings, household).await
}

async fn household_detail(
    pool: &PgPool,
    ceilings: &Ceilings,
    household: Household,
) -> Result<HouseholdDetail> {
    let parcels = sqlx::query_as::<_, Parcel>(
        r#"
        SELECT * FROM parcels
        WHERE household_id = $1 AND parent_parcel_id IS NULL
        ORDER BY survey_no, id
        "#,
    )
    .bind(household.id)
    .fetch_all(pool)
    .await?;

    let derived = sqlx::query_as::<_, Parcel>(
        r#"
        SELECT * FROM parcels
        WHERE parent_parcel_id IN (
            SELECT id FROM parcels WHERE household_id = $1 AND parent_parcel_id IS NULL
        )
        ORDER BY survey_no, id
        "#,
    )
    .bind(household.id)
    .fetch_all(pool)
    .await?;

    let members = sqlx::query_as::<_, HouseholdMember>(
        r#"SELECT * FROM household_members WHERE household_id = $1 ORDER BY id"#,
    )
    .bind(household.id)
    .fetch_all(pool)
    .await?;

    let holdings: Vec<_> = parcels.iter().map(Parcel::holding).collect();
    let summary = summarize_holding(&holdings, ceilings);

    Ok(HouseholdDetail {
        household,
        parcels,
        derived,
        members,
        summary,
    })
}

/// Households whose aggregate holding exceeds the owner ceiling, largest
/// first, with derived-parcel counts from any prior split.
pub async fn list_subdivision_queue(
    pool: &PgPool,
    ceilings: &Ceilings,
    filter: QueueFilter,
) -> Result<Vec<QueueEntry>> {
    let entries = match filter {
        QueueFilter::All => {
            sqlx::query_as::<_, QueueEntry>(
                r#"
                SELECT h.id AS household_id, h.national_id, h.prefix, h.first_name, h.last_name,
                       COUNT(p.id) AS parcel_count,
                       ROUND(SUM(p.area_rai + p.area_ngan / 4.0 + p.area_sqwa / 400.0)::numeric, 2)::double precision AS total_rai,
                       (SELECT COUNT(*) FROM parcels d
                        JOIN parcels op ON d.parent_parcel_id = op.id
                        WHERE op.household_id = h.id) AS derived_count
                FROM parcels p
                JOIN households h ON p.household_id = h.id
                WHERE p.parent_parcel_id IS NULL
                GROUP BY h.id
                HAVING SUM(p.area_rai + p.area_ngan / 4.0 + p.area_sqwa / 400.0) > $1
                ORDER BY total_rai DESC
                "#,
            )
            .bind(ceilings.owner_rai)
            .fetch_all(pool)
            .await?
        }
        QueueFilter::NeedsSplit => {
            sqlx::query_as::<_, QueueEntry>(
                r#"
                SELECT h.id AS household_id, h.national_id, h.prefix, h.first_name, h.last_name,
                       COUNT(p.id) AS parcel_count,
                       ROUND(SUM(p.area_rai + p.area_ngan / 4.0 + p.area_sqwa / 400.0)::numeric, 2)::double precision AS total_rai,
                       (SELECT COUNT(*) FROM parcels d
                        JOIN parcels op ON d.parent_parcel_id = op.id
                        WHERE op.household_id = h.id) AS derived_count
                FROM parcels p
                JOIN households h ON p.household_id = h.id
                WHERE p.parent_parcel_id IS NULL
                GROUP BY h.id
                HAVING SUM(p.area_rai + p.area_ngan / 4.0 + p.area_sqwa / 400.0) > $1
                   AND SUM(p.area_rai + p.area_ngan / 4.0 + p.area_sqwa / 400.0) <= $2
                ORDER BY total_rai DESC
                "#,
            )
            .bind(ceilings.owner_rai)
            .bind(ceilings.combined_rai())
            .fetch_all(pool)
            .await?
        }
        QueueFilter::ExcessStateClaim => {
            sqlx::query_as::<_, QueueEntry>(
                r#"
                SELECT h.id AS household_id, h.national_id, h.prefix, h.first_name, h.last_name,
                       COUNT(p.id) AS parcel_count,
                       ROUND(SUM(p.area_rai + p.area_ngan / 4.0 + p.area_sqwa / 400.0)::numeric, 2)::double precision AS total_rai,
                       (SELECT COUNT(*) FROM parcels d
                        JOIN parcels op ON d.parent_parcel_id = op.id
                        WHERE op.household_id = h.id) AS derived_count
                FROM parcels p
                JOIN households h ON p.household_id = h.id
                WHERE p.parent_parcel_id IS NULL
                GROUP BY h.id
                HAVING SUM(p.area_rai + p.area_ngan / 4.0 + p.area_sqwa / 400.0) > $1
                ORDER BY total_rai DESC
                "#,
            )
            .bind(ceilings.combined_rai())
            .fetch_all(pool)
            .await?
        }
    };

    Ok(entries)
}

/// The household's committed split, joined with the receiving members.
pub async fn list_allocations(
    pool: &PgPool,
    household_id: i64,
) -> Result<Vec<AllocationWithMember>> {
    let rows = sqlx::query_as::<_, AllocationWithMember>(
        r#"
        SELECT a.id, a.parcel_id, a.household_id, a.category, a.area_rai, a.member_id,
               a.created_at,
               m.prefix AS member_prefix,
               m.first_name AS member_first_name,
               m.last_name AS member_last_name,
               m.relationship AS member_relationship
        FROM allocations a
        LEFT JOIN household_members m ON a.member_id = m.id
        WHERE a.household_id = $1
        ORDER BY a.parcel_id, a.id
        "#,
    )
    .bind(household_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Verified / pending counts across all households.
pub async fn verification_stats(pool: &PgPool) -> Result<VerificationStats> {
    let stats = sqlx::query_as::<_, VerificationStats>(
        r#"
        SELECT COUNT(*) AS total,
               COUNT(*) FILTER (WHERE verification_status = 'verified') AS verified,
               COUNT(*) FILTER (WHERE verification_status <> 'verified') AS pending
        FROM households
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(stats)
}

/// Register a household member outside of a split submission.
pub async fn add_household_member(
    pool: &PgPool,
    household_id: i64,
    member: &NewMember,
) -> Result<HouseholdMember> {
    if let Some(reason) = member.rejection_reason() {
        return Err(RegistryError::Validation(ValidationError::InvalidMember {
            index: member.index,
            reason: reason.to_string(),
        }));
    }

    let created = sqlx::query_as::<_, HouseholdMember>(
        r#"
        INSERT INTO household_members
            (household_id, prefix, first_name, last_name, national_id, relationship)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(household_id)
    .bind(&member.prefix)
    .bind(&member.first_name)
    .bind(&member.last_name)
    .bind(&member.national_id)
    .bind(&member.relationship)
    .fetch_one(pool)
    .await?;

    tracing::info!(member_id = created.id, household_id, "member registered");
    Ok(created)
}
