//! Storage location hierarchy types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{InventoryError, InventoryResult};

/// Locations nest at most this many levels, roots included
pub const MAX_LOCATION_DEPTH: usize = 5;

/// Whether a location can still be browsed and used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LocationState {
	Live,
	Deleted { deleted_at: DateTime<Utc> },
}

impl LocationState {
	pub fn from_deleted_at(deleted_at: Option<DateTime<Utc>>) -> Self {
		match deleted_at {
			Some(deleted_at) => LocationState::Deleted { deleted_at },
			None => LocationState::Live,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
	pub id: Uuid,
	pub workspace_id: Uuid,
	pub parent_id: Option<Uuid>,
	pub name: String,
	/// Ancestor ids from the root down to and including this location
	pub path: MaterializedPath,
	pub state: LocationState,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Location {
	pub fn depth(&self) -> usize {
		self.path.depth()
	}

	pub fn is_live(&self) -> bool {
		self.state == LocationState::Live
	}
}

/// One step in a location's ancestry, root first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
	pub id: Uuid,
	pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationDetails {
	pub location: Location,
	pub breadcrumbs: Vec<Breadcrumb>,
}

/// Ordered list of location ids from a root to a node.
///
/// Stored as `/<root>/<child>/.../<self>/` so that a subtree is exactly the
/// set of rows whose path starts with the subtree root's path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializedPath(Vec<Uuid>);

impl MaterializedPath {
	pub fn root(id: Uuid) -> Self {
		Self(vec![id])
	}

	/// Path of a new child below `self`
	pub fn child(&self, id: Uuid) -> Self {
		let mut ids = self.0.clone();
		ids.push(id);
		Self(ids)
	}

	pub fn depth(&self) -> usize {
		self.0.len()
	}

	pub fn ids(&self) -> &[Uuid] {
		&self.0
	}

	/// Ancestors of the node, excluding the node itself
	pub fn ancestors(&self) -> &[Uuid] {
		match self.0.split_last() {
			Some((_, ancestors)) => ancestors,
			None => &[],
		}
	}

	pub fn encode(&self) -> String {
		let mut out = String::from("/");
		for id in &self.0 {
			out.push_str(&id.to_string());
			out.push('/');
		}
		out
	}

	pub fn decode(raw: &str) -> InventoryResult<Self> {
		let ids = raw
			.split('/')
			.filter(|segment| !segment.is_empty())
			.map(Uuid::parse_str)
			.collect::<Result<Vec<_>, _>>()
			.map_err(|_| InventoryError::StorageUnavailable {
				reason: "corrupted location path",
			})?;

		if ids.is_empty() {
			return Err(InventoryError::StorageUnavailable {
				reason: "empty location path",
			});
		}

		Ok(Self(ids))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn path_round_trips_through_storage_form() {
		let root = Uuid::new_v4();
		let child = Uuid::new_v4();
		let path = MaterializedPath::root(root).child(child);

		let encoded = path.encode();
		assert_eq!(encoded, format!("/{root}/{child}/"));
		assert_eq!(MaterializedPath::decode(&encoded).unwrap(), path);
	}

	#[test]
	fn subtree_paths_share_prefix() {
		let root = MaterializedPath::root(Uuid::new_v4());
		let grandchild = root.child(Uuid::new_v4()).child(Uuid::new_v4());

		assert!(grandchild.encode().starts_with(&root.encode()));
		assert_eq!(grandchild.depth(), 3);
		assert_eq!(grandchild.ancestors().len(), 2);
		assert_eq!(grandchild.ancestors()[0], root.ids()[0]);
	}

	#[test]
	fn decode_rejects_garbage() {
		assert!(MaterializedPath::decode("/not-a-uuid/").is_err());
		assert!(MaterializedPath::decode("/").is_err());
	}
}
