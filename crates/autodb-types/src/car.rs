use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::Principal;
use crate::temporal::Timestamp;

/// Unique, immutable key of a [`Car`] record.
///
/// Ordered lexicographically; stores iterate records in this order.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CarId(String);

impl CarId {
    /// Generate a fresh random id (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` if the id is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for CarId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CarId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CarId({})", self.0)
    }
}

impl fmt::Display for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller-supplied input for creating or updating a car.
///
/// Carries no id, owner, or timestamps; those are always derived by the
/// service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarPayload {
    pub name: String,
    pub model: String,
    pub cubic_capacity_of_engine: u32,
    pub price: u64,
    pub top_speed: u32,
    pub company_name: String,
    pub image: String,
}

/// A persisted car record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: CarId,
    pub name: String,
    pub model: String,
    pub cubic_capacity_of_engine: u32,
    pub price: u64,
    pub top_speed: u32,
    pub company_name: String,
    pub image: String,
    pub owner: Principal,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

impl Car {
    /// Build a fresh record from a payload. `updated_at` starts absent.
    pub fn new(id: CarId, payload: CarPayload, owner: Principal, created_at: Timestamp) -> Self {
        let CarPayload {
            name,
            model,
            cubic_capacity_of_engine,
            price,
            top_speed,
            company_name,
            image,
        } = payload;
        Self {
            id,
            name,
            model,
            cubic_capacity_of_engine,
            price,
            top_speed,
            company_name,
            image,
            owner,
            created_at,
            updated_at: None,
        }
    }

    /// Apply an update payload.
    ///
    /// Every payload field replaces the stored one; `id`, `owner` and
    /// `created_at` are carried over. Destructuring both sides keeps this
    /// exhaustive: adding a field to either struct fails to compile here.
    pub fn merged_with(&self, payload: CarPayload, at: Timestamp) -> Self {
        let CarPayload {
            name,
            model,
            cubic_capacity_of_engine,
            price,
            top_speed,
            company_name,
            image,
        } = payload;
        let Car {
            id,
            owner,
            created_at,
            ..
        } = self;
        Self {
            id: id.clone(),
            name,
            model,
            cubic_capacity_of_engine,
            price,
            top_speed,
            company_name,
            image,
            owner: owner.clone(),
            created_at: *created_at,
            updated_at: Some(at),
        }
    }

    /// Copy of this record with a new owner.
    pub fn with_owner(&self, owner: Principal, at: Timestamp) -> Self {
        Self {
            owner,
            updated_at: Some(at),
            ..self.clone()
        }
    }

    /// Copy of this record with a new image reference.
    pub fn with_image(&self, image: String, at: Timestamp) -> Self {
        Self {
            image,
            updated_at: Some(at),
            ..self.clone()
        }
    }

    pub fn is_owned_by(&self, principal: &Principal) -> bool {
        &self.owner == principal
    }

    /// The payload that would recreate this record's descriptive fields.
    pub fn to_payload(&self) -> CarPayload {
        CarPayload {
            name: self.name.clone(),
            model: self.model.clone(),
            cubic_capacity_of_engine: self.cubic_capacity_of_engine,
            price: self.price,
            top_speed: self.top_speed,
            company_name: self.company_name.clone(),
            image: self.image.clone(),
        }
    }

    pub fn history_entry(&self) -> HistoryEntry {
        HistoryEntry {
            owner: self.owner.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Minimal audit view of a record. Prior versions are not retained.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub owner: Principal,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

/// Caller preferences for recommendations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub company_name: Option<String>,
    pub model: Option<String>,
    pub max_price: Option<u64>,
    pub min_top_speed: Option<u32>,
}
