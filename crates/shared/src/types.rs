//! Common types used across Slopeline

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

// =============================================================================
// ID Wrappers
// =============================================================================

/// User ID wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// Lesson Assignment
// =============================================================================

/// Who a lesson is assigned to.
///
/// A lesson is always in exactly one of two states: assigned to an instructor,
/// or unassigned. On the wire the unassigned state is the literal string
/// `"None"` and the assigned state is the instructor's UUID; in storage it is
/// a nullable `assigned_to` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    Unassigned,
    Instructor(UserId),
}

impl Assignment {
    pub fn is_unassigned(&self) -> bool {
        matches!(self, Assignment::Unassigned)
    }

    /// The nullable UUID form bound into SQL queries
    pub fn as_db(&self) -> Option<Uuid> {
        match self {
            Assignment::Unassigned => None,
            Assignment::Instructor(id) => Some(id.0),
        }
    }
}

impl From<Option<Uuid>> for Assignment {
    fn from(value: Option<Uuid>) -> Self {
        match value {
            None => Assignment::Unassigned,
            Some(id) => Assignment::Instructor(UserId(id)),
        }
    }
}

impl Serialize for Assignment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Assignment::Unassigned => serializer.serialize_str("None"),
            Assignment::Instructor(id) => id.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Assignment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == "None" {
            return Ok(Assignment::Unassigned);
        }
        Uuid::parse_str(&raw)
            .map(|id| Assignment::Instructor(UserId(id)))
            .map_err(|_| {
                de::Error::invalid_value(
                    de::Unexpected::Str(&raw),
                    &"an instructor UUID or the sentinel \"None\"",
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_wire_format() {
        let unassigned = Assignment::Unassigned;
        assert_eq!(
            serde_json::to_string(&unassigned).unwrap(),
            r#""None""#
        );

        let id = Uuid::new_v4();
        let assigned = Assignment::Instructor(UserId(id));
        assert_eq!(
            serde_json::to_string(&assigned).unwrap(),
            format!(r#""{}""#, id)
        );
    }

    #[test]
    fn test_assignment_parse() {
        let unassigned: Assignment = serde_json::from_str(r#""None""#).unwrap();
        assert!(unassigned.is_unassigned());

        let id = Uuid::new_v4();
        let assigned: Assignment = serde_json::from_str(&format!(r#""{}""#, id)).unwrap();
        assert_eq!(assigned, Assignment::Instructor(UserId(id)));

        // Anything that is neither "None" nor a UUID is rejected
        let bad: Result<Assignment, _> = serde_json::from_str(r#""nobody""#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_assignment_db_mapping() {
        let id = Uuid::new_v4();
        assert_eq!(Assignment::from(Some(id)).as_db(), Some(id));
        assert_eq!(Assignment::from(None).as_db(), None);
    }
}
