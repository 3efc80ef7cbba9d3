//! Boxes: the catalogued physical containers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Location, QrCode};
use crate::error::{InventoryError, InventoryResult};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 2000;
pub const MAX_TAGS: usize = 20;
pub const MAX_TAG_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageBox {
	pub id: Uuid,
	pub workspace_id: Uuid,
	/// `None` means the box is unassigned
	pub location_id: Option<Uuid>,
	pub short_code: String,
	pub name: String,
	pub description: Option<String>,
	pub tags: Vec<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// Input for creating a box
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewBox {
	pub name: String,
	pub description: Option<String>,
	#[serde(default)]
	pub tags: Vec<String>,
	pub location_id: Option<Uuid>,
	pub qr_code_id: Option<Uuid>,
}

impl NewBox {
	pub fn named(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Default::default()
		}
	}

	pub fn in_location(mut self, location_id: Uuid) -> Self {
		self.location_id = Some(location_id);
		self
	}

	pub fn with_qr_code(mut self, qr_code_id: Uuid) -> Self {
		self.qr_code_id = Some(qr_code_id);
		self
	}

	pub fn with_tags<I, S>(mut self, tags: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.tags = tags.into_iter().map(Into::into).collect();
		self
	}
}

/// Field changes for an existing box; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoxUpdate {
	pub name: Option<String>,
	/// `Some(None)` clears the description
	pub description: Option<Option<String>>,
	pub tags: Option<Vec<String>>,
}

impl BoxUpdate {
	pub fn is_empty(&self) -> bool {
		self.name.is_none() && self.description.is_none() && self.tags.is_none()
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxDetails {
	pub storage_box: StorageBox,
	pub location: Option<Location>,
	pub qr_code: Option<QrCode>,
}

/// Placement filter for box searches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "location_id", rename_all = "snake_case")]
pub enum LocationFilter {
	#[default]
	Any,
	Unassigned,
	At(Uuid),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoxSearch {
	pub query: Option<String>,
	#[serde(default)]
	pub location: LocationFilter,
	/// 1-based page number
	pub page: u64,
	pub page_size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
	pub items: Vec<T>,
	pub page: u64,
	pub page_size: u64,
	pub total_items: u64,
}

impl<T> Page<T> {
	pub fn total_pages(&self) -> u64 {
		if self.page_size == 0 {
			return 0;
		}
		self.total_items.div_ceil(self.page_size)
	}
}

/// Trim and bound a display name (boxes, locations, workspaces)
pub fn validate_name(field: &'static str, raw: &str) -> InventoryResult<String> {
	let name = raw.trim();
	if name.is_empty() {
		return Err(InventoryError::invalid_input(field, "must not be empty"));
	}
	if name.chars().count() > MAX_NAME_LEN {
		return Err(InventoryError::invalid_input(
			field,
			format!("must be at most {MAX_NAME_LEN} characters"),
		));
	}
	Ok(name.to_string())
}

/// Empty descriptions are stored as `None`
pub fn validate_description(raw: Option<&str>) -> InventoryResult<Option<String>> {
	let Some(description) = raw.map(str::trim).filter(|d| !d.is_empty()) else {
		return Ok(None);
	};
	if description.chars().count() > MAX_DESCRIPTION_LEN {
		return Err(InventoryError::invalid_input(
			"description",
			format!("must be at most {MAX_DESCRIPTION_LEN} characters"),
		));
	}
	Ok(Some(description.to_string()))
}

/// Lowercases, trims, drops blanks and duplicates while keeping first-seen order
pub fn normalize_tags<S: AsRef<str>>(raw: &[S]) -> InventoryResult<Vec<String>> {
	let mut tags: Vec<String> = Vec::with_capacity(raw.len());
	for tag in raw {
		let tag = tag.as_ref().trim().to_lowercase();
		if tag.is_empty() || tags.contains(&tag) {
			continue;
		}
		if tag.chars().count() > MAX_TAG_LEN {
			return Err(InventoryError::invalid_input(
				"tags",
				format!("each tag must be at most {MAX_TAG_LEN} characters"),
			));
		}
		tags.push(tag);
	}
	if tags.len() > MAX_TAGS {
		return Err(InventoryError::invalid_input(
			"tags",
			format!("at most {MAX_TAGS} tags are allowed"),
		));
	}
	Ok(tags)
}
