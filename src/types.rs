//! Core data types shared across the server

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audience zone an app is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Student,
    Teacher,
    Both,
}

impl Zone {
    /// Whether a record with this zone is visible to `audience`.
    /// `Both` records are visible everywhere.
    pub fn visible_to(&self, audience: Zone) -> bool {
        *self == audience || *self == Zone::Both
    }
}

/// A curated app link as stored in the collection.
///
/// Field names are camelCase on the wire and in the document file.
/// `isEnabled` was historically optional in stored documents; absence
/// means enabled, resolved once at deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRecord {
    /// Store-assigned stable id
    pub id: String,

    pub name: String,

    /// External link the card opens
    pub url: String,

    /// Public URL of the icon image
    pub icon_url: String,

    pub zone: Zone,

    /// Optional display hint (card accent color)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Display position, ascending. Sparse values are tolerated;
    /// `normalize_orders` repairs drift.
    pub order: i64,

    #[serde(default = "default_enabled")]
    pub is_enabled: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_enabled() -> bool {
    true
}

/// Fields supplied by the caller when creating an app. The catalog
/// assigns `order` and timestamps; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDraft {
    pub name: String,
    pub url: String,
    pub icon_url: String,
    pub zone: Zone,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
}

/// Partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<Zone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    /// Refreshed by the catalog on every write; never taken from the
    /// client but carried here so batch updates set it too.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl AppPatch {
    /// Apply this patch to a record in place.
    pub fn apply(&self, record: &mut AppRecord) {
        if let Some(ref name) = self.name {
            record.name = name.clone();
        }
        if let Some(ref url) = self.url {
            record.url = url.clone();
        }
        if let Some(ref icon_url) = self.icon_url {
            record.icon_url = icon_url.clone();
        }
        if let Some(zone) = self.zone {
            record.zone = zone;
        }
        if let Some(ref color) = self.color {
            record.color = Some(color.clone());
        }
        if let Some(order) = self.order {
            record.order = order;
        }
        if let Some(is_enabled) = self.is_enabled {
            record.is_enabled = is_enabled;
        }
        if let Some(updated_at) = self.updated_at {
            record.updated_at = updated_at;
        }
    }
}
