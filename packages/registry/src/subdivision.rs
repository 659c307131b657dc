//! Transactional commit of a validated category split
//!
//! The only write path for allocation state. Every commit runs inside one
//! database transaction: the household's prior split and derived parcels are
//! deleted and the new state recreated in full. Any failure rolls the whole
//! transaction back, leaving the prior state untouched.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use sqlx::{PgPool, Postgres, Transaction};

use landtenure_engine::{
    summarize_holding, validate, Area, Category, Ceilings, HoldingStatus, MemberRef,
    ValidatedSplit,
};

use crate::codes::{self, CodePrefix};
use crate::error::{RegistryError, Result};
use crate::models::{
    AllocationCategory, CommitSummary, DerivedParcelRef, Household, HouseholdMember, Parcel,
    VerificationStatus,
};

struct ResolvedRow {
    parcel_id: i64,
    category: Category,
    area_rai: f64,
    member_id: Option<i64>,
    /// Household that takes ownership of the derived parcel; differs from the
    /// submitting household when a heir is itself a registered household
    assignee_household_id: i64,
}

/// Validate a submission against the household's current parcels and members,
/// then commit it. The library-level entry point for the submission contract.
pub async fn submit_allocation(
    pool: &PgPool,
    ceilings: &Ceilings,
    submission: &landtenure_engine::AllocationSubmission,
) -> Result<CommitSummary> {
    let parcels = original_parcels(pool, submission.household_id).await?;
    if parcels.is_empty() {
        // A household unknown to the registry has no parcels either way;
        // distinguish the two for the caller
        let exists = sqlx::query_scalar::<_, i64>(r#"SELECT id FROM households WHERE id = $1"#)
            .bind(submission.household_id)
            .fetch_optional(pool)
            .await?;
        if exists.is_none() {
            return Err(RegistryError::HouseholdNotFound(
                submission.household_id.to_string(),
            ));
        }
    }

    let member_ids = sqlx::query_scalar::<_, i64>(
        r#"SELECT id FROM household_members WHERE household_id = $1"#,
    )
    .bind(submission.household_id)
    .fetch_all(pool)
    .await?;

    let holdings: Vec<_> = parcels.iter().map(Parcel::holding).collect();
    let split = validate(&holdings, &member_ids, ceilings, submission)?;

    commit(pool, &split).await
}

/// Commit a validated split, replacing the household's prior split in full.
#[tracing::instrument(skip(pool, split), fields(household_id = split.household_id()))]
pub async fn commit(pool: &PgPool, split: &ValidatedSplit) -> Result<CommitSummary> {
    let household_id = split.household_id();
    let mut tx = pool.begin().await?;

    // Serialize commits per household; delete-then-recreate must never
    // interleave with another writer's view of the same household
    sqlx::query(r#"SELECT pg_advisory_xact_lock($1)"#)
        .bind(household_id)
        .execute(&mut *tx)
        .await?;

    let household = sqlx::query_as::<_, Household>(
        r#"SELECT * FROM households WHERE id = $1 FOR UPDATE"#,
    )
    .bind(household_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| RegistryError::HouseholdNotFound(household_id.to_string()))?;

    // New members first, so rows have identities to reference
    let mut new_member_ids: HashMap<u32, i64> = HashMap::new();
    for member in split.new_members() {
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
        .fetch_one(&mut *tx)
        .await?;
        new_member_ids.insert(member.index, created.id);
        tracing::info!(member_id = created.id, index = member.index, "member created");
    }

    let mut resolved = Vec::with_capacity(split.rows().len());
    for row in split.rows() {
        let member_id = match row.member_ref {
            Some(MemberRef::Existing(id)) => Some(id),
            Some(MemberRef::New(index)) => new_member_ids.get(&index).copied(),
            None => None,
        };
        let assignee_household_id = match (row.category, member_id) {
            (Category::Heir, Some(member_id)) => {
                resolve_heir_household(&mut tx, member_id)
                    .await?
                    .unwrap_or(household_id)
            }
            _ => household_id,
        };
        resolved.push(ResolvedRow {
            parcel_id: row.parcel_id,
            category: row.category,
            area_rai: row.area_rai,
            member_id,
            assignee_household_id,
        });
    }

    // Full replace: prior split rows and every derived parcel hanging off
    // this household's originals
    sqlx::query(r#"DELETE FROM allocations WHERE household_id = $1"#)
        .bind(household_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        r#"
        DELETE FROM parcels
        WHERE parent_parcel_id IN (
            SELECT id FROM parcels WHERE household_id = $1 AND parent_parcel_id IS NULL
        )
        "#,
    )
    .bind(household_id)
    .execute(&mut *tx)
    .await?;

    for row in &resolved {
        sqlx::query(
            r#"
            INSERT INTO allocations (parcel_id, household_id, category, area_rai, member_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(row.parcel_id)
        .bind(household_id)
        .bind(AllocationCategory::from(row.category))
        .bind(row.area_rai)
        .bind(row.member_id)
        .execute(&mut *tx)
        .await?;
    }

    update_summary_tags(&mut tx, household_id, &resolved).await?;

    // Derived parcels for every non-owner share
    let mut derived = Vec::new();
    for row in &resolved {
        let Some(prefix) = CodePrefix::for_category(row.category) else {
            continue;
        };
        let parcel = create_derived_parcel(&mut tx, prefix, row).await?;
        derived.push(parcel);
    }

    sqlx::query(
        r#"
        UPDATE households
        SET verification_status = 'verified', verified_at = now()
        WHERE id = $1
        "#,
    )
    .bind(household_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        household_id,
        national_id = %household.national_id,
        allocation_rows = resolved.len(),
        derived_parcels = derived.len(),
        "allocation committed"
    );

    Ok(CommitSummary {
        household_id,
        verification_status: VerificationStatus::Verified,
        allocation_rows: resolved.len(),
        derived_parcels: derived,
    })
}

/// Simple-approval path for holdings at or under the owner ceiling: every
/// original parcel is tagged `owner` and the household marked verified, with
/// no validation or derivation.
#[tracing::instrument(skip(pool, ceilings))]
pub async fn approve_within_ceiling(
    pool: &PgPool,
    ceilings: &Ceilings,
    household_id: i64,
) -> Result<CommitSummary> {
    let mut tx = pool.begin().await?;

    sqlx::query(r#"SELECT pg_advisory_xact_lock($1)"#)
        .bind(household_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query_as::<_, Household>(r#"SELECT * FROM households WHERE id = $1 FOR UPDATE"#)
        .bind(household_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RegistryError::HouseholdNotFound(household_id.to_string()))?;

    let parcels = sqlx::query_as::<_, Parcel>(
        r#"
        SELECT * FROM parcels
        WHERE household_id = $1 AND parent_parcel_id IS NULL
        ORDER BY survey_no, id
        "#,
    )
    .bind(household_id)
    .fetch_all(&mut *tx)
    .await?;

    let holdings: Vec<_> = parcels.iter().map(Parcel::holding).collect();
    let summary = summarize_holding(&holdings, ceilings);
    if summary.status != HoldingStatus::WithinCeiling {
        return Err(RegistryError::CeilingExceeded {
            total_rai: summary.total_rai,
            ceiling_rai: ceilings.owner_rai,
        });
    }

    sqlx::query(
        r#"
        UPDATE parcels SET allocation_category = 'owner'
        WHERE household_id = $1 AND parent_parcel_id IS NULL
        "#,
    )
    .bind(household_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        UPDATE households
        SET verification_status = 'verified', verified_at = now()
        WHERE id = $1
        "#,
    )
    .bind(household_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(household_id, total_rai = summary.total_rai, "household approved");

    Ok(CommitSummary {
        household_id,
        verification_status: VerificationStatus::Verified,
        allocation_rows: 0,
        derived_parcels: Vec::new(),
    })
}

async fn original_parcels(pool: &PgPool, household_id: i64) -> Result<Vec<Parcel>> {
    let parcels = sqlx::query_as::<_, Parcel>(
        r#"
        SELECT * FROM parcels
        WHERE household_id = $1 AND parent_parcel_id IS NULL
        ORDER BY survey_no, id
        "#,
    )
    .bind(household_id)
    .fetch_all(pool)
    .await?;
    Ok(parcels)
}

/// Household to route a heir's derived parcel to: the household whose
/// national id matches the member's, when the member carries one.
async fn resolve_heir_household(
    tx: &mut Transaction<'_, Postgres>,
    member_id: i64,
) -> Result<Option<i64>> {
    let household_id = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT h.id
        FROM household_members m
        JOIN households h ON h.national_id = m.national_id
        WHERE m.id = $1 AND m.national_id IS NOT NULL AND m.national_id <> ''
        "#,
    )
    .bind(member_id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(household_id)
}

/// Recompute each parcel's summary tag from the new rows. Parcels the
/// submission does not touch fall back to `unallocated`.
async fn update_summary_tags(
    tx: &mut Transaction<'_, Postgres>,
    household_id: i64,
    rows: &[ResolvedRow],
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE parcels SET allocation_category = 'unallocated'
        WHERE household_id = $1 AND parent_parcel_id IS NULL
        "#,
    )
    .bind(household_id)
    .execute(&mut **tx)
    .await?;

    let mut categories: BTreeMap<i64, BTreeSet<Category>> = BTreeMap::new();
    for row in rows {
        categories.entry(row.parcel_id).or_default().insert(row.category);
    }

    for (parcel_id, present) in categories {
        let tag = if present.len() > 1 {
            AllocationCategory::Split
        } else {
            match present.into_iter().next() {
                Some(category) => AllocationCategory::from(category),
                None => AllocationCategory::Unallocated,
            }
        };
        sqlx::query(r#"UPDATE parcels SET allocation_category = $2 WHERE id = $1"#)
            .bind(parcel_id)
            .bind(tag)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

/// Create one derived parcel for a non-owner row: sequenced code, parent
/// reference, component area from the decimal share, and the parent's
/// descriptive metadata copied verbatim.
async fn create_derived_parcel(
    tx: &mut Transaction<'_, Postgres>,
    prefix: CodePrefix,
    row: &ResolvedRow,
) -> Result<DerivedParcelRef> {
    let parent = sqlx::query_as::<_, Parcel>(r#"SELECT * FROM parcels WHERE id = $1"#)
        .bind(row.parcel_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(RegistryError::ParcelNotFound(row.parcel_id))?;

    let survey_no = codes::next_code(&mut **tx, prefix).await?;
    let code = codes::format_code(survey_no);
    let area = Area::from_rai(row.area_rai);
    let category = AllocationCategory::from(row.category);
    let notes = match row.category {
        Category::State => format!("state reclamation surplus from parcel {}", parent.code),
        _ => format!("household split from parcel {}", parent.code),
    };

    let created = sqlx::query_as::<_, Parcel>(
        r#"
        INSERT INTO parcels
            (code, survey_no, household_id, parent_parcel_id, allocation_category,
             area_rai, area_ngan, area_sqwa,
             park_name, zone, land_use, village, province, status, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, 'surveyed', $14)
        RETURNING *
        "#,
    )
    .bind(&code)
    .bind(survey_no)
    .bind(row.assignee_household_id)
    .bind(parent.id)
    .bind(category)
    .bind(area.rai as i32)
    .bind(area.ngan as i32)
    .bind(area.sqwa as i32)
    .bind(&parent.park_name)
    .bind(&parent.zone)
    .bind(&parent.land_use)
    .bind(&parent.village)
    .bind(&parent.province)
    .bind(&notes)
    .fetch_one(&mut **tx)
    .await?;

    tracing::info!(
        parcel_id = created.id,
        code = %created.code,
        parent_parcel_id = parent.id,
        category = ?category,
        "derived parcel created"
    );

    Ok(DerivedParcelRef {
        parcel_id: created.id,
        code: created.code,
        survey_no,
        category,
        area_rai: row.area_rai,
    })
}
