//! Allocation submission contract
//!
//! The strongly-typed payload an external caller (UI or API) assembles for a
//! full category split. The engine never reads interactive draft state; this
//! DTO is the only input surface.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Allocation category of a submitted row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Retained by the original holder
    Owner,
    /// Transferred to a named household heir
    Heir,
    /// Surrendered to the state reclamation program
    State,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Owner => "owner",
            Category::Heir => "heir",
            Category::State => "state",
        };
        f.write_str(s)
    }
}

/// Reference to the member receiving a heir allocation.
///
/// Serialized as a bare member id for existing members, or `"new:<index>"`
/// for a member defined in the same submission's `new_members` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberRef {
    Existing(i64),
    New(u32),
}

impl fmt::Display for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberRef::Existing(id) => write!(f, "{id}"),
            MemberRef::New(index) => write!(f, "new:{index}"),
        }
    }
}

impl FromStr for MemberRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(index) = s.strip_prefix("new:") {
            let index = index
                .parse::<u32>()
                .map_err(|_| format!("invalid new-member index: {s:?}"))?;
            return Ok(MemberRef::New(index));
        }
        s.parse::<i64>()
            .map(MemberRef::Existing)
            .map_err(|_| format!("invalid member reference: {s:?}"))
    }
}

impl Serialize for MemberRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MemberRef::Existing(id) => serializer.serialize_i64(*id),
            MemberRef::New(_) => serializer.serialize_str(&self.to_string()),
        }
    }
}

struct MemberRefVisitor;

impl Visitor<'_> for MemberRefVisitor {
    type Value = MemberRef;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a member id or a \"new:<index>\" string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<MemberRef, E> {
        Ok(MemberRef::Existing(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<MemberRef, E> {
        i64::try_from(v)
            .map(MemberRef::Existing)
            .map_err(|_| E::custom(format!("member id out of range: {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<MemberRef, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for MemberRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MemberRefVisitor)
    }
}

/// One proposed allocation row: a category share of a single parcel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRequest {
    pub parcel_id: i64,
    pub category: Category,
    /// Share in decimal rai
    pub area: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heir_member_ref: Option<MemberRef>,
}

/// A household member defined inline with the submission.
///
/// Persisted before the allocation rows that reference it, so `new:<index>`
/// references have an identity to resolve to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMember {
    pub index: u32,
    #[serde(default)]
    pub prefix: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    pub relationship: Option<String>,
}

impl NewMember {
    /// Reason this definition cannot be persisted, if any.
    ///
    /// Creation failures reject the member explicitly rather than inserting
    /// blank records.
    pub fn rejection_reason(&self) -> Option<&'static str> {
        if self.first_name.trim().is_empty() {
            Some("first name is required")
        } else if self.last_name.trim().is_empty() {
            Some("last name is required")
        } else {
            None
        }
    }
}

/// A full category split for one household, replacing any prior split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSubmission {
    pub household_id: i64,
    #[serde(default)]
    pub allocations: Vec<AllocationRequest>,
    #[serde(default)]
    pub new_members: Vec<NewMember>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_ref_display_and_parse() {
        assert_eq!(MemberRef::Existing(17).to_string(), "17");
        assert_eq!(MemberRef::New(2).to_string(), "new:2");
        assert_eq!("17".parse::<MemberRef>(), Ok(MemberRef::Existing(17)));
        assert_eq!("new:2".parse::<MemberRef>(), Ok(MemberRef::New(2)));
        assert!("new:x".parse::<MemberRef>().is_err());
        assert!("".parse::<MemberRef>().is_err());
    }

    #[test]
    fn test_member_ref_serde() {
        let existing: MemberRef = serde_json::from_str("17").unwrap();
        assert_eq!(existing, MemberRef::Existing(17));
        let new: MemberRef = serde_json::from_str(r#""new:3""#).unwrap();
        assert_eq!(new, MemberRef::New(3));
        assert_eq!(serde_json::to_string(&existing).unwrap(), "17");
        assert_eq!(serde_json::to_string(&new).unwrap(), r#""new:3""#);
    }

    #[test]
    fn test_submission_deserialization() {
        let json = r#"{
            "household_id": 42,
            "allocations": [
                {"parcel_id": 1, "category": "owner", "area": 20.0},
                {"parcel_id": 1, "category": "heir", "area": 5.0, "heir_member_ref": "new:1"}
            ],
            "new_members": [
                {"index": 1, "first_name": "Somchai", "last_name": "K.", "relationship": "son"}
            ]
        }"#;
        let submission: AllocationSubmission = serde_json::from_str(json).unwrap();
        assert_eq!(submission.household_id, 42);
        assert_eq!(submission.allocations.len(), 2);
        assert_eq!(submission.allocations[0].category, Category::Owner);
        assert_eq!(
            submission.allocations[1].heir_member_ref,
            Some(MemberRef::New(1))
        );
        assert_eq!(submission.new_members[0].rejection_reason(), None);
    }

    #[test]
    fn test_blank_member_rejected() {
        let member = NewMember {
            index: 1,
            prefix: None,
            first_name: "  ".into(),
            last_name: "K.".into(),
            national_id: None,
            relationship: None,
        };
        assert_eq!(member.rejection_reason(), Some("first name is required"));
    }

    #[test]
    fn test_category_serde() {
        assert_eq!(serde_json::to_string(&Category::State).unwrap(), r#""state""#);
        let parsed: Category = serde_json::from_str(r#""heir""#).unwrap();
        assert_eq!(parsed, Category::Heir);
    }
}
