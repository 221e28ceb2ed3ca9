use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::OwnerInfo;

/// An equipment row on the scheduling board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: String,
    /// Short display code, e.g. `V-3300A`.
    pub tag: String,
    pub description: String,
    /// Denormalized `"{tag} - {description}"` display label.
    pub tag_and_description: String,
    /// Display sequencing only; rewritten contiguously on reorder.
    pub sort_order: i64,
    pub created_on: DateTime<Utc>,
    pub modified_on: DateTime<Utc>,
    pub owner: OwnerInfo,
    pub state_code: String,
}

impl Equipment {
    /// The display label derived from tag and description.
    pub fn display_label(tag: &str, description: &str) -> String {
        if description.is_empty() {
            tag.to_string()
        } else {
            format!("{tag} - {description}")
        }
    }
}

/// Partial equipment fields for a save. An absent `id` means "create new".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentPatch {
    pub id: Option<String>,
    pub tag: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i64>,
}

impl EquipmentPatch {
    pub fn update(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }
}
