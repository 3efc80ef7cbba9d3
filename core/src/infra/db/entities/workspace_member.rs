//! Workspace membership entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::{self, Role};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "workspace_members")]
pub struct Model {
	#[sea_orm(primary_key, auto_increment = false)]
	pub workspace_id: Uuid,
	#[sea_orm(primary_key, auto_increment = false)]
	pub principal_id: Uuid,
	pub role: Role,
	pub joined_at: DateTimeUtc,
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
}

impl Related<super::workspace::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Workspace.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
	pub fn to_domain(&self) -> domain::Member {
		domain::Member {
			workspace_id: self.workspace_id,
			principal_id: self.principal_id,
			role: self.role,
			joined_at: self.joined_at,
		}
	}
}
