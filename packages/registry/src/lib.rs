//! Landtenure Registry
//!
//! Persistence and orchestration layer for the land-tenure allocation
//! engine: transactional commit of category splits, derived-parcel creation
//! with sequenced codes, and the verification read paths. Pure allocation
//! logic lives in `landtenure-engine`; this crate owns everything that
//! touches Postgres.

pub mod api;
pub mod codes;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod registry;
pub mod subdivision;

pub use config::{ApiConfig, RegistryConfig};
pub use db::{create_pool, run_migrations};
pub use error::RegistryError;
pub use models::{
    AllocationCategory, AllocationWithMember, CommitSummary, DerivedParcelRef, Household,
    HouseholdMember, Parcel, ParcelStatus, QueueEntry, QueueFilter, VerificationStats,
    VerificationStatus,
};
pub use registry::HouseholdDetail;
pub use subdivision::{approve_within_ceiling, commit, submit_allocation};
