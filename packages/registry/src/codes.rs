//! Derived-parcel code sequencing
//!
//! Derived parcels embed a single category digit followed by a zero-padded
//! sequence number, scoped globally per digit: survey numbers run `30001`,
//! `30002`, … for heir-derived parcels and `40001`, `40002`, … for
//! state-derived ones. The parcel code renders the same number as
//! `SUB-<digit>-<seq>`.
//!
//! Numbers are issued from the `code_sequences` counter table inside the
//! commit transaction; the row update takes a row-level lock, so concurrent
//! commits deriving parcels with the same digit serialize instead of racing
//! a max-scan. UNIQUE constraints on `parcels.code` and `parcels.survey_no`
//! back this up.

use landtenure_engine::Category;

use crate::error::{RegistryError, Result};

const SEQUENCE_SPAN: i64 = 10_000;

/// Category digit prefixing a derived parcel's survey number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodePrefix {
    /// Heir-derived, digit 3
    Heir,
    /// State-derived, digit 4
    State,
}

impl CodePrefix {
    pub fn digit(self) -> i16 {
        match self {
            CodePrefix::Heir => 3,
            CodePrefix::State => 4,
        }
    }

    /// Sequence base; the first issued number is `base + 1` (`30001`/`40001`)
    pub fn base(self) -> i64 {
        i64::from(self.digit()) * SEQUENCE_SPAN
    }

    /// Prefix for a non-owner allocation category; owner rows derive nothing
    pub fn for_category(category: Category) -> Option<CodePrefix> {
        match category {
            Category::Owner => None,
            Category::Heir => Some(CodePrefix::Heir),
            Category::State => Some(CodePrefix::State),
        }
    }
}

/// Render a survey number as a parcel code, e.g. `30001` -> `SUB-3-0001`
pub fn format_code(survey_no: i64) -> String {
    format!(
        "SUB-{}-{:04}",
        survey_no / SEQUENCE_SPAN,
        survey_no % SEQUENCE_SPAN
    )
}

/// Next survey number from a scan of existing numbers: maximum in the
/// prefix's range plus one, or the prefix's first number when none exist.
///
/// Kept for seeding a counter from pre-existing data; the commit path issues
/// from [`next_code`] instead.
pub fn next_survey_no(prefix: CodePrefix, existing: &[i64]) -> i64 {
    existing
        .iter()
        .copied()
        .filter(|n| n / SEQUENCE_SPAN == i64::from(prefix.digit()))
        .max()
        .map(|max| max + 1)
        .unwrap_or(prefix.base() + 1)
}

/// Issue the next survey number for a prefix digit.
///
/// Must run inside the commit transaction; the `UPDATE … RETURNING` locks
/// the counter row until the transaction ends.
pub async fn next_code<'e, E>(executor: E, prefix: CodePrefix) -> Result<i64>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE code_sequences
        SET last_no = last_no + 1
        WHERE prefix = $1
        RETURNING last_no
        "#,
    )
    .bind(prefix.digit())
    .fetch_optional(executor)
    .await?
    .ok_or(RegistryError::SequenceNotSeeded(prefix.digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_digits() {
        assert_eq!(CodePrefix::Heir.digit(), 3);
        assert_eq!(CodePrefix::State.digit(), 4);
        assert_eq!(CodePrefix::Heir.base(), 30_000);
        assert_eq!(CodePrefix::State.base(), 40_000);
    }

    #[test]
    fn test_prefix_for_category() {
        assert_eq!(CodePrefix::for_category(Category::Owner), None);
        assert_eq!(
            CodePrefix::for_category(Category::Heir),
            Some(CodePrefix::Heir)
        );
        assert_eq!(
            CodePrefix::for_category(Category::State),
            Some(CodePrefix::State)
        );
    }

    #[test]
    fn test_format_code() {
        assert_eq!(format_code(30_001), "SUB-3-0001");
        assert_eq!(format_code(40_123), "SUB-4-0123");
    }

    #[test]
    fn test_next_survey_no_empty_starts_at_base() {
        assert_eq!(next_survey_no(CodePrefix::Heir, &[]), 30_001);
        assert_eq!(next_survey_no(CodePrefix::State, &[]), 40_001);
    }

    #[test]
    fn test_next_survey_no_increments_max_in_range() {
        let existing = [30_001, 30_017, 40_002, 12_345];
        assert_eq!(next_survey_no(CodePrefix::Heir, &existing), 30_018);
        assert_eq!(next_survey_no(CodePrefix::State, &existing), 40_003);
    }
}
