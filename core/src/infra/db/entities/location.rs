//! Location entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
	domain::{self, LocationState, MaterializedPath},
	error::InventoryResult,
};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "locations")]
pub struct Model {
	#[sea_orm(primary_key, auto_increment = false)]
	pub id: Uuid,
	#[sea_orm(indexed)]
	pub workspace_id: Uuid,
	#[sea_orm(nullable, indexed)]
	pub parent_id: Option<Uuid>,
	pub name: String,
	/// Encoded [`MaterializedPath`], `/<root>/.../<self>/`
	#[sea_orm(indexed)]
	pub path: String,
	pub depth: i32,
	/// Tombstone; deleted rows stay for the audit trail
	pub deleted_at: Option<DateTimeUtc>,
	pub created_at: DateTimeUtc,
	pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(
		belongs_to = "super::workspace::Entity",
		from = "Column::WorkspaceId",
		to = "super::workspace::Column::Id",
		on_delete = "Cascade"
	)]
	Workspace,
	#[sea_orm(
		belongs_to = "Entity",
		from = "Column::ParentId",
		to = "Column::Id"
	)]
	Parent,
}

impl Related<super::workspace::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Workspace.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
	pub fn is_live(&self) -> bool {
		self.deleted_at.is_none()
	}

	pub fn to_domain(&self) -> InventoryResult<domain::Location> {
		Ok(domain::Location {
			id: self.id,
			workspace_id: self.workspace_id,
			parent_id: self.parent_id,
			name: self.name.clone(),
			path: MaterializedPath::decode(&self.path)?,
			state: LocationState::from_deleted_at(self.deleted_at),
			created_at: self.created_at,
			updated_at: self.updated_at,
		})
	}
}
