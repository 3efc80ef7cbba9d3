//! QR code entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
	domain::{self, QrState, QrStatus},
	error::{InventoryError, InventoryResult},
};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "qr_codes")]
pub struct Model {
	#[sea_orm(primary_key, auto_increment = false)]
	pub id: Uuid,
	#[sea_orm(indexed)]
	pub workspace_id: Uuid,
	#[sea_orm(unique)]
	pub short_code: String,
	pub status: QrStatus,
	#[sea_orm(nullable, unique)]
	pub box_id: Option<Uuid>,
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
		belongs_to = "super::storage_box::Entity",
		from = "Column::BoxId",
		to = "super::storage_box::Column::Id",
		on_delete = "NoAction"
	)]
	StorageBox,
}

impl Related<super::workspace::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Workspace.def()
	}
}

impl Related<super::storage_box::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::StorageBox.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
	pub fn to_domain(&self) -> InventoryResult<domain::QrCode> {
		let state = match (self.status, self.box_id) {
			(QrStatus::Generated, None) => QrState::Generated,
			(QrStatus::Assigned, Some(box_id)) => QrState::Assigned { box_id },
			_ => {
				return Err(InventoryError::StorageUnavailable {
					reason: "QR code status disagrees with its box reference",
				})
			}
		};

		Ok(domain::QrCode {
			id: self.id,
			workspace_id: self.workspace_id,
			short_code: self.short_code.clone(),
			state,
			created_at: self.created_at,
			updated_at: self.updated_at,
		})
	}
}
