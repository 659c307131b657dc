use thiserror::Error;

use landtenure_engine::ValidationError;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("household not found: {0}")]
    HouseholdNotFound(String),

    #[error("parcel not found: {0}")]
    ParcelNotFound(i64),

    #[error("invalid submission: {0}")]
    Validation(#[from] ValidationError),

    #[error("holding of {total_rai} rai exceeds the {ceiling_rai} rai ceiling, a full split is required")]
    CeilingExceeded { total_rai: f64, ceiling_rai: f64 },

    #[error("code sequence not seeded for prefix digit {0}")]
    SequenceNotSeeded(i16),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
