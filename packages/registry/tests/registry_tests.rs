mod common;

use pretty_assertions::assert_eq;

use landtenure_engine::{
    AllocationRequest, AllocationSubmission, Category, Ceilings, HoldingStatus, MemberRef,
    NewMember, ValidationError,
};
use landtenure_registry::models::QueueFilter;
use landtenure_registry::{registry, subdivision, RegistryError};

#[tokio::test]
async fn test_find_household_by_national_id() {
    let db = common::TestDb::new().await;
    let ceilings = Ceilings::default();

    let household = common::seed_household(&db.pool, "1100500200001", "Somsak", "P.").await;
    common::seed_parcel(&db.pool, household.id, "P-4000", 15, 0, 0).await;
    common::seed_parcel(&db.pool, household.id, "P-4001", 10, 2, 0).await;
    common::seed_member(&db.pool, household.id, "Somchai", "P.", None).await;

    let detail = registry::find_household_by_national_id(&db.pool, &ceilings, "1100500200001")
        .await
        .unwrap();

    assert_eq!(detail.household.id, household.id);
    assert_eq!(detail.parcels.len(), 2);
    assert_eq!(detail.members.len(), 1);
    assert!(detail.derived.is_empty());
    assert_eq!(detail.summary.parcel_count, 2);
    assert_eq!(detail.summary.total_rai, 25.5);
    assert_eq!(detail.summary.status, HoldingStatus::NeedsSplit);
}

#[tokio::test]
async fn test_find_household_unknown_national_id() {
    let db = common::TestDb::new().await;

    let err =
        registry::find_household_by_national_id(&db.pool, &Ceilings::default(), "9999999999999")
            .await
            .unwrap_err();
    assert!(matches!(err, RegistryError::HouseholdNotFound(_)));
}

#[tokio::test]
async fn test_household_detail_includes_derived_after_split() {
    let db = common::TestDb::new().await;
    let ceilings = Ceilings::default();

    let household = common::seed_household(&db.pool, "1100500200002", "Pranee", "S.").await;
    let parcel = common::seed_parcel(&db.pool, household.id, "P-4002", 25, 0, 0).await;
    let member = common::seed_member(&db.pool, household.id, "Malee", "S.", None).await;

    let submission = AllocationSubmission {
        household_id: household.id,
        allocations: vec![
            AllocationRequest {
                parcel_id: parcel.id,
                category: Category::Owner,
                area: 20.0,
                heir_member_ref: None,
            },
            AllocationRequest {
                parcel_id: parcel.id,
                category: Category::Heir,
                area: 5.0,
                heir_member_ref: Some(MemberRef::Existing(member.id)),
            },
        ],
        new_members: vec![],
    };
    subdivision::submit_allocation(&db.pool, &ceilings, &submission)
        .await
        .unwrap();

    let detail = registry::get_household(&db.pool, &ceilings, household.id)
        .await
        .unwrap();
    // Derived parcels are listed separately and never counted into the holding
    assert_eq!(detail.parcels.len(), 1);
    assert_eq!(detail.derived.len(), 1);
    assert_eq!(detail.summary.total_rai, 25.0);
}

#[tokio::test]
async fn test_subdivision_queue_filters() {
    let db = common::TestDb::new().await;
    let ceilings = Ceilings::default();

    let small = common::seed_household(&db.pool, "1100500200010", "Small", "H.").await;
    common::seed_parcel(&db.pool, small.id, "P-4010", 15, 0, 0).await;

    let split = common::seed_household(&db.pool, "1100500200011", "Split", "H.").await;
    common::seed_parcel(&db.pool, split.id, "P-4011", 25, 0, 0).await;

    let excess = common::seed_household(&db.pool, "1100500200012", "Excess", "H.").await;
    common::seed_parcel(&db.pool, excess.id, "P-4012", 30, 0, 0).await;
    common::seed_parcel(&db.pool, excess.id, "P-4013", 15, 0, 0).await;

    // Everything over the owner ceiling, largest holding first
    let all = registry::list_subdivision_queue(&db.pool, &ceilings, QueueFilter::All)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].household_id, excess.id);
    assert_eq!(all[0].total_rai, 45.0);
    assert_eq!(all[0].parcel_count, 2);
    assert_eq!(all[1].household_id, split.id);
    assert_eq!(all[1].total_rai, 25.0);

    let needs_split =
        registry::list_subdivision_queue(&db.pool, &ceilings, QueueFilter::NeedsSplit)
            .await
            .unwrap();
    assert_eq!(needs_split.len(), 1);
    assert_eq!(needs_split[0].household_id, split.id);

    let excess_only =
        registry::list_subdivision_queue(&db.pool, &ceilings, QueueFilter::ExcessStateClaim)
            .await
            .unwrap();
    assert_eq!(excess_only.len(), 1);
    assert_eq!(excess_only[0].household_id, excess.id);
}

#[tokio::test]
async fn test_subdivision_queue_counts_derived_parcels() {
    let db = common::TestDb::new().await;
    let ceilings = Ceilings::default();

    let household = common::seed_household(&db.pool, "1100500200020", "Counted", "H.").await;
    let parcel = common::seed_parcel(&db.pool, household.id, "P-4020", 25, 0, 0).await;
    let member = common::seed_member(&db.pool, household.id, "Heir", "H.", None).await;

    let submission = AllocationSubmission {
        household_id: household.id,
        allocations: vec![
            AllocationRequest {
                parcel_id: parcel.id,
                category: Category::Owner,
                area: 20.0,
                heir_member_ref: None,
            },
            AllocationRequest {
                parcel_id: parcel.id,
                category: Category::Heir,
                area: 5.0,
                heir_member_ref: Some(MemberRef::Existing(member.id)),
            },
        ],
        new_members: vec![],
    };
    subdivision::submit_allocation(&db.pool, &ceilings, &submission)
        .await
        .unwrap();

    let entries = registry::list_subdivision_queue(&db.pool, &ceilings, QueueFilter::All)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].derived_count, 1);
    // The derived parcel never re-enters the aggregate
    assert_eq!(entries[0].total_rai, 25.0);
    assert_eq!(entries[0].parcel_count, 1);
}

#[tokio::test]
async fn test_list_allocations_joins_member_names() {
    let db = common::TestDb::new().await;
    let ceilings = Ceilings::default();

    let household = common::seed_household(&db.pool, "1100500200030", "Joined", "H.").await;
    let parcel = common::seed_parcel(&db.pool, household.id, "P-4030", 25, 0, 0).await;
    let member = common::seed_member(&db.pool, household.id, "Somchai", "H.", None).await;

    let submission = AllocationSubmission {
        household_id: household.id,
        allocations: vec![
            AllocationRequest {
                parcel_id: parcel.id,
                category: Category::Owner,
                area: 20.0,
                heir_member_ref: None,
            },
            AllocationRequest {
                parcel_id: parcel.id,
                category: Category::Heir,
                area: 5.0,
                heir_member_ref: Some(MemberRef::Existing(member.id)),
            },
        ],
        new_members: vec![],
    };
    subdivision::submit_allocation(&db.pool, &ceilings, &submission)
        .await
        .unwrap();

    let rows = registry::list_allocations(&db.pool, household.id).await.unwrap();
    assert_eq!(rows.len(), 2);

    let heir = rows
        .iter()
        .find(|r| r.member_id.is_some())
        .unwrap();
    assert_eq!(heir.member_first_name.as_deref(), Some("Somchai"));
    assert_eq!(heir.member_relationship.as_deref(), Some("child"));
    assert_eq!(heir.area_rai, 5.0);

    let owner = rows.iter().find(|r| r.member_id.is_none()).unwrap();
    assert_eq!(owner.member_first_name, None);
    assert_eq!(owner.area_rai, 20.0);
}

#[tokio::test]
async fn test_verification_stats() {
    let db = common::TestDb::new().await;
    let ceilings = Ceilings::default();

    let approved = common::seed_household(&db.pool, "1100500200040", "Done", "H.").await;
    common::seed_parcel(&db.pool, approved.id, "P-4040", 10, 0, 0).await;
    common::seed_household(&db.pool, "1100500200041", "Waiting", "H.").await;

    subdivision::approve_within_ceiling(&db.pool, &ceilings, approved.id)
        .await
        .unwrap();

    let stats = registry::verification_stats(&db.pool).await.unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.verified, 1);
    assert_eq!(stats.pending, 1);
}

#[tokio::test]
async fn test_add_household_member() {
    let db = common::TestDb::new().await;

    let household = common::seed_household(&db.pool, "1100500200050", "Parent", "H.").await;

    let member = NewMember {
        index: 0,
        prefix: Some("Ms.".into()),
        first_name: "Kanya".into(),
        last_name: "H.".into(),
        national_id: Some("1100500200051".into()),
        relationship: Some("daughter".into()),
    };
    let created = registry::add_household_member(&db.pool, household.id, &member)
        .await
        .unwrap();
    assert_eq!(created.household_id, household.id);
    assert_eq!(created.first_name, "Kanya");
    assert_eq!(created.national_id.as_deref(), Some("1100500200051"));
}

#[tokio::test]
async fn test_add_household_member_rejects_blank_name() {
    let db = common::TestDb::new().await;

    let household = common::seed_household(&db.pool, "1100500200060", "Parent", "H.").await;

    let member = NewMember {
        index: 0,
        prefix: None,
        first_name: String::new(),
        last_name: "H.".into(),
        national_id: None,
        relationship: None,
    };
    let err = registry::add_household_member(&db.pool, household.id, &member)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RegistryError::Validation(ValidationError::InvalidMember { .. })
    ));
}
