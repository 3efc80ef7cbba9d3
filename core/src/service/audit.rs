//! Audit trail of workspace mutations

use chrono::{DateTime, Utc};
use sea_orm::{
	ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
	QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::WorkspaceAccess;
use crate::{
	error::{ErrorCode, InventoryResult},
	infra::db::entities::{
		audit_log::{self, ActionStatus},
		AuditLog, AuditLogActive,
	},
};

/// One recorded mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
	pub id: Uuid,
	pub workspace_id: Uuid,
	pub action: String,
	pub principal_id: Uuid,
	pub status: ActionStatus,
	pub created_at: DateTime<Utc>,
	pub completed_at: Option<DateTime<Utc>>,
	pub error_code: Option<String>,
}

impl From<audit_log::Model> for AuditEntry {
	fn from(model: audit_log::Model) -> Self {
		Self {
			id: model.uuid,
			workspace_id: model.workspace_id,
			action: model.action_type,
			principal_id: model.principal_id,
			status: model.status,
			created_at: model.created_at,
			completed_at: model.completed_at,
			error_code: model.error_code,
		}
	}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AuditTrail;

impl AuditTrail {
	/// Open an `in_progress` entry for an authorized mutation
	pub async fn begin<C: ConnectionTrait>(
		&self,
		db: &C,
		access: &WorkspaceAccess,
		action: &str,
	) -> InventoryResult<audit_log::Model> {
		let mut entry = AuditLogActive::new();
		entry.workspace_id = Set(access.workspace_id());
		entry.principal_id = Set(access.principal_id());
		entry.action_type = Set(action.to_string());

		Ok(entry.insert(db).await?)
	}

	/// Close an entry with the outcome of the mutation
	pub async fn finish<C: ConnectionTrait>(
		&self,
		db: &C,
		entry: audit_log::Model,
		failure: Option<ErrorCode>,
	) -> InventoryResult<()> {
		let mut active: AuditLogActive = entry.into();
		active.completed_at = Set(Some(Utc::now()));
		match failure {
			None => active.status = Set(ActionStatus::Completed),
			Some(code) => {
				active.status = Set(ActionStatus::Failed);
				active.error_code = Set(Some(code.as_str().to_string()));
			}
		}
		active.update(db).await?;
		Ok(())
	}

	/// Most recent entries first
	pub async fn list<C: ConnectionTrait>(
		&self,
		db: &C,
		access: &WorkspaceAccess,
		limit: u64,
	) -> InventoryResult<Vec<AuditEntry>> {
		let entries = AuditLog::find()
			.filter(audit_log::Column::WorkspaceId.eq(access.workspace_id()))
			.order_by_desc(audit_log::Column::CreatedAt)
			.order_by_desc(audit_log::Column::Id)
			.limit(limit)
			.all(db)
			.await?;

		Ok(entries.into_iter().map(AuditEntry::from).collect())
	}
}
