//! Location hierarchy
//!
//! Locations form a forest per workspace. Each row stores its materialized
//! path (`/<root>/.../<self>/`) and depth, so depth checks, ancestry and
//! subtree selection never need recursive queries. Renames don't move a
//! node, so paths are written once at creation and never recomputed.

use chrono::Utc;
use sea_orm::{
	sea_query::SimpleExpr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
	PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{is_unique_violation, WorkspaceAccess};
use crate::{
	domain::{
		storage_box::validate_name, Breadcrumb, Location, LocationDetails, MaterializedPath,
		MAX_LOCATION_DEPTH,
	},
	error::{EntityKind, InventoryError, InventoryResult},
	infra::db::entities::{location, storage_box, LocationActive, StorageBox, StorageBoxActive},
};

/// What a soft delete touched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftDeleteOutcome {
	/// The target followed by its live descendants
	pub location_ids: Vec<Uuid>,
	pub unassigned_boxes: u64,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LocationHierarchy;

impl LocationHierarchy {
	pub async fn create<C: ConnectionTrait>(
		&self,
		db: &C,
		access: &WorkspaceAccess,
		parent_id: Option<Uuid>,
		name: &str,
	) -> InventoryResult<Location> {
		let workspace_id = access.workspace_id();
		let name = validate_name("name", name)?;
		let id = Uuid::new_v4();

		let path = match parent_id {
			Some(parent_id) => {
				let parent = self.live_location_in(db, workspace_id, parent_id).await?;
				MaterializedPath::decode(&parent.path)?.child(id)
			}
			None => MaterializedPath::root(id),
		};

		if path.depth() > MAX_LOCATION_DEPTH {
			debug!(%workspace_id, ?parent_id, "Refused location beyond max depth");
			return Err(InventoryError::MaxDepthExceeded {
				max: MAX_LOCATION_DEPTH,
			});
		}

		self.ensure_unique_name(db, workspace_id, parent_id, &name, None)
			.await?;

		let now = Utc::now();
		let model = LocationActive {
			id: Set(id),
			workspace_id: Set(workspace_id),
			parent_id: Set(parent_id),
			name: Set(name.clone()),
			path: Set(path.encode()),
			depth: Set(path.depth() as i32),
			deleted_at: Set(None),
			created_at: Set(now),
			updated_at: Set(now),
		}
		.insert(db)
		.await
		.map_err(|e| duplicate_or_storage(e, &name))?;

		info!(%workspace_id, location_id = %id, depth = model.depth, "Created location");
		model.to_domain()
	}

	/// Rename in place; position and therefore path are unchanged
	pub async fn rename<C: ConnectionTrait>(
		&self,
		db: &C,
		access: &WorkspaceAccess,
		location_id: Uuid,
		name: &str,
	) -> InventoryResult<Location> {
		let workspace_id = access.workspace_id();
		let name = validate_name("name", name)?;
		let current = self.live_location_in(db, workspace_id, location_id).await?;

		if current.name == name {
			return current.to_domain();
		}

		self.ensure_unique_name(db, workspace_id, current.parent_id, &name, Some(location_id))
			.await?;

		let mut active: LocationActive = current.into();
		active.name = Set(name.clone());
		active.updated_at = Set(Utc::now());
		let model = active
			.update(db)
			.await
			.map_err(|e| duplicate_or_storage(e, &name))?;

		info!(%workspace_id, %location_id, "Renamed location");
		model.to_domain()
	}

	/// Tombstone a location and its live subtree, unassigning every box
	/// placed anywhere in it.
	///
	/// Must run inside a transaction: both writes land together or not at all.
	pub async fn soft_delete<C: ConnectionTrait>(
		&self,
		db: &C,
		access: &WorkspaceAccess,
		location_id: Uuid,
	) -> InventoryResult<SoftDeleteOutcome> {
		let workspace_id = access.workspace_id();
		let target = self.live_location_in(db, workspace_id, location_id).await?;

		let subtree = location::Entity::find()
			.filter(location::Column::WorkspaceId.eq(workspace_id))
			.filter(location::Column::DeletedAt.is_null())
			.filter(location::Column::Path.starts_with(target.path.as_str()))
			.order_by_asc(location::Column::Depth)
			.all(db)
			.await?;
		let location_ids: Vec<Uuid> = subtree.iter().map(|l| l.id).collect();

		let now = Utc::now();
		let unassigned_boxes = StorageBox::update_many()
			.set(StorageBoxActive {
				location_id: Set(None),
				updated_at: Set(now),
				..Default::default()
			})
			.filter(storage_box::Column::WorkspaceId.eq(workspace_id))
			.filter(storage_box::Column::LocationId.is_in(location_ids.clone()))
			.exec(db)
			.await?
			.rows_affected;

		let tombstoned = location::Entity::update_many()
			.set(LocationActive {
				deleted_at: Set(Some(now)),
				updated_at: Set(now),
				..Default::default()
			})
			.filter(location::Column::Id.is_in(location_ids.clone()))
			.filter(location::Column::DeletedAt.is_null())
			.exec(db)
			.await?
			.rows_affected;

		if tombstoned == 0 {
			// Lost a race with another delete of the same subtree
			warn!(%workspace_id, %location_id, "Location was deleted concurrently");
			return Err(InventoryError::not_found(EntityKind::Location, location_id));
		}

		info!(
			%workspace_id,
			%location_id,
			locations = location_ids.len(),
			unassigned_boxes,
			"Soft-deleted location"
		);

		Ok(SoftDeleteOutcome {
			location_ids,
			unassigned_boxes,
		})
	}

	/// Live children of `parent_id` (roots when `None`), ordered by name
	pub async fn list_children<C: ConnectionTrait>(
		&self,
		db: &C,
		access: &WorkspaceAccess,
		parent_id: Option<Uuid>,
	) -> InventoryResult<Vec<Location>> {
		let workspace_id = access.workspace_id();
		if let Some(parent_id) = parent_id {
			self.live_location_in(db, workspace_id, parent_id).await?;
		}

		location::Entity::find()
			.filter(location::Column::WorkspaceId.eq(workspace_id))
			.filter(parent_matches(parent_id))
			.filter(location::Column::DeletedAt.is_null())
			.order_by_asc(location::Column::Name)
			.order_by_asc(location::Column::Id)
			.all(db)
			.await?
			.iter()
			.map(location::Model::to_domain)
			.collect()
	}

	/// A live location with its ancestors, root first
	pub async fn get<C: ConnectionTrait>(
		&self,
		db: &C,
		access: &WorkspaceAccess,
		location_id: Uuid,
	) -> InventoryResult<LocationDetails> {
		let model = self
			.live_location_in(db, access.workspace_id(), location_id)
			.await?;
		let location = model.to_domain()?;

		let ancestor_ids = location.path.ancestors().to_vec();
		let names: HashMap<Uuid, String> = if ancestor_ids.is_empty() {
			HashMap::new()
		} else {
			location::Entity::find()
				.filter(location::Column::Id.is_in(ancestor_ids.clone()))
				.all(db)
				.await?
				.into_iter()
				.map(|l| (l.id, l.name))
				.collect()
		};

		let breadcrumbs = ancestor_ids
			.into_iter()
			.map(|id| {
				names
					.get(&id)
					.map(|name| Breadcrumb {
						id,
						name: name.clone(),
					})
					.ok_or(InventoryError::StorageUnavailable {
						reason: "location path references a missing ancestor",
					})
			})
			.collect::<InventoryResult<Vec<_>>>()?;

		Ok(LocationDetails {
			location,
			breadcrumbs,
		})
	}

	/// Load a location that exists, is live and belongs to `workspace_id`
	pub(crate) async fn live_location_in<C: ConnectionTrait>(
		&self,
		db: &C,
		workspace_id: Uuid,
		location_id: Uuid,
	) -> InventoryResult<location::Model> {
		location::Entity::find_by_id(location_id)
			.one(db)
			.await?
			.filter(|l| l.workspace_id == workspace_id && l.is_live())
			.ok_or_else(|| InventoryError::not_found(EntityKind::Location, location_id))
	}

	async fn ensure_unique_name<C: ConnectionTrait>(
		&self,
		db: &C,
		workspace_id: Uuid,
		parent_id: Option<Uuid>,
		name: &str,
		except: Option<Uuid>,
	) -> InventoryResult<()> {
		let mut query = location::Entity::find()
			.filter(location::Column::WorkspaceId.eq(workspace_id))
			.filter(parent_matches(parent_id))
			.filter(location::Column::Name.eq(name))
			.filter(location::Column::DeletedAt.is_null());
		if let Some(except) = except {
			query = query.filter(location::Column::Id.ne(except));
		}

		if query.count(db).await? > 0 {
			return Err(InventoryError::DuplicateSiblingName {
				name: name.to_string(),
			});
		}
		Ok(())
	}
}

fn parent_matches(parent_id: Option<Uuid>) -> SimpleExpr {
	match parent_id {
		Some(parent_id) => location::Column::ParentId.eq(parent_id),
		None => location::Column::ParentId.is_null(),
	}
}

/// The live-sibling index is the last line of defence against racing creates
fn duplicate_or_storage(err: sea_orm::DbErr, name: &str) -> InventoryError {
	if is_unique_violation(&err) {
		warn!(name, "Sibling name taken by a concurrent write");
		InventoryError::DuplicateSiblingName {
			name: name.to_string(),
		}
	} else {
		err.into()
	}
}
