//! Audit log entity for tracking workspace mutations

use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_log")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i32,

	#[sea_orm(unique)]
	pub uuid: Uuid,

	#[sea_orm(indexed)]
	pub workspace_id: Uuid,

	#[sea_orm(indexed)]
	pub action_type: String,

	pub principal_id: Uuid,

	#[sea_orm(indexed)]
	pub status: ActionStatus,

	pub created_at: DateTimeUtc,
	pub completed_at: Option<DateTimeUtc>,

	/// Stable error code for failed actions
	pub error_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
	#[sea_orm(string_value = "in_progress")]
	InProgress,
	#[sea_orm(string_value = "completed")]
	Completed,
	#[sea_orm(string_value = "failed")]
	Failed,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {
	fn new() -> Self {
		Self {
			uuid: Set(Uuid::new_v4()),
			status: Set(ActionStatus::InProgress),
			created_at: Set(chrono::Utc::now()),
			..ActiveModelTrait::default()
		}
	}
}
