use crate::model::lenient;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Record identifier. The backend emits both numeric and string ids; both are kept as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(String);

impl EntityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.trim().to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl PartialEq<str> for EntityId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.trim()
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

struct EntityIdVisitor;

impl Visitor<'_> for EntityIdVisitor {
    type Value = EntityId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or integer id")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<EntityId, E> {
        Ok(EntityId::from(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<EntityId, E> {
        Ok(EntityId::from(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<EntityId, E> {
        Ok(EntityId(value.to_string()))
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(EntityIdVisitor)
    }
}

/// Reference to an organisational unit (department, team, functional group).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRef {
    pub id: EntityId,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
}

/// Reference to an individual staff member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffRef {
    pub id: EntityId,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
}

impl UnitRef {
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl StaffRef {
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Either a bare id or an embedded object carrying one, e.g. `parentTask: 7` or `parentTask: {"id": 7}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum IdOrRef {
    Id(EntityId),
    Ref { id: EntityId },
}

impl IdOrRef {
    pub(crate) fn into_id(self) -> EntityId {
        match self {
            Self::Id(id) | Self::Ref { id } => id,
        }
    }
}
