//! Box entity
//!
//! Table is `boxes`; the module avoids the `box` keyword.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
	domain,
	error::{InventoryError, InventoryResult},
};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "boxes")]
pub struct Model {
	#[sea_orm(primary_key, auto_increment = false)]
	pub id: Uuid,
	#[sea_orm(indexed)]
	pub workspace_id: Uuid,
	#[sea_orm(nullable, indexed)]
	pub location_id: Option<Uuid>,
	pub short_code: String,
	pub name: String,
	pub description: Option<String>,
	/// Lowercased copies of `name` and `description` for search
	pub name_folded: String,
	pub description_folded: Option<String>,
	/// JSON array of normalized tags
	pub tags: String,
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
		belongs_to = "super::location::Entity",
		from = "Column::LocationId",
		to = "super::location::Column::Id",
		on_delete = "SetNull"
	)]
	Location,
}

impl Related<super::workspace::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Workspace.def()
	}
}

impl Related<super::location::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Location.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}

pub fn encode_tags(tags: &[String]) -> String {
	serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

/// Unicode lowercase used for the search columns and search input
pub fn fold_case(text: &str) -> String {
	text.to_lowercase()
}

impl Model {
	pub fn to_domain(&self) -> InventoryResult<domain::StorageBox> {
		let tags: Vec<String> =
			serde_json::from_str(&self.tags).map_err(|_| InventoryError::StorageUnavailable {
				reason: "corrupted box tags",
			})?;

		Ok(domain::StorageBox {
			id: self.id,
			workspace_id: self.workspace_id,
			location_id: self.location_id,
			short_code: self.short_code.clone(),
			name: self.name.clone(),
			description: self.description.clone(),
			tags,
			created_at: self.created_at,
			updated_at: self.updated_at,
		})
	}
}
