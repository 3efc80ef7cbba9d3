//! Workspace entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "workspaces")]
pub struct Model {
	#[sea_orm(primary_key, auto_increment = false)]
	pub id: Uuid,
	pub name: String,
	pub owner_id: Uuid,
	pub created_at: DateTimeUtc,
	pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
	pub fn to_domain(&self) -> domain::Workspace {
		domain::Workspace {
			id: self.id,
			name: self.name.clone(),
			owner_id: self.owner_id,
			created_at: self.created_at,
			updated_at: self.updated_at,
		}
	}
}
