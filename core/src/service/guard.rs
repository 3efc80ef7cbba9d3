//! Workspace authorization

use sea_orm::{ConnectionTrait, EntityTrait};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
	domain::{Principal, Role},
	error::{InventoryError, InventoryResult},
	infra::db::entities::WorkspaceMember,
};

/// Proof that a principal holds at least some role in a workspace.
///
/// Only [`TenantGuard::authorize`] can construct one, so every component
/// method taking `&WorkspaceAccess` is unreachable without a passed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceAccess {
	workspace_id: Uuid,
	principal_id: Uuid,
	role: Role,
}

impl WorkspaceAccess {
	pub fn workspace_id(&self) -> Uuid {
		self.workspace_id
	}

	pub fn principal_id(&self) -> Uuid {
		self.principal_id
	}

	pub fn role(&self) -> Role {
		self.role
	}

	/// Escalation check for operations whose required role depends on input
	pub fn require(&self, required: Role) -> InventoryResult<()> {
		if self.role.permits(required) {
			Ok(())
		} else {
			Err(InventoryError::InsufficientRole {
				required,
				actual: self.role,
			})
		}
	}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TenantGuard;

impl TenantGuard {
	/// Check that `principal` is a member of `workspace_id` with at least `required`.
	///
	/// A missing workspace and a missing membership are indistinguishable.
	pub async fn authorize<C: ConnectionTrait>(
		&self,
		db: &C,
		principal: &Principal,
		workspace_id: Uuid,
		required: Role,
	) -> InventoryResult<WorkspaceAccess> {
		let membership = WorkspaceMember::find_by_id((workspace_id, principal.id))
			.one(db)
			.await?;

		let Some(membership) = membership else {
			warn!(
				principal_id = %principal.id,
				%workspace_id,
				"Rejected request from non-member"
			);
			return Err(InventoryError::NotAMember { workspace_id });
		};

		let access = WorkspaceAccess {
			workspace_id,
			principal_id: principal.id,
			role: membership.role,
		};

		if let Err(e) = access.require(required) {
			warn!(
				principal_id = %principal.id,
				%workspace_id,
				role = %membership.role,
				%required,
				"Rejected request with insufficient role"
			);
			return Err(e);
		}

		debug!(principal_id = %principal.id, %workspace_id, role = %membership.role, "Authorized");
		Ok(access)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{infra::db::Database, service::WorkspaceDirectory};

	#[tokio::test]
	async fn members_are_checked_against_role_order() {
		let db = Database::memory().await.unwrap();
		let owner = Principal::new(Uuid::new_v4());
		let workspace = WorkspaceDirectory
			.create(db.conn(), &owner, "Home")
			.await
			.unwrap();

		let access = TenantGuard
			.authorize(db.conn(), &owner, workspace.id, Role::Admin)
			.await
			.unwrap();
		assert_eq!(access.role(), Role::Owner);
		assert_eq!(access.workspace_id(), workspace.id);
		assert!(access.require(Role::Owner).is_ok());
	}

	#[tokio::test]
	async fn outsiders_get_not_a_member_for_real_and_fake_workspaces() {
		let db = Database::memory().await.unwrap();
		let owner = Principal::new(Uuid::new_v4());
		let stranger = Principal::new(Uuid::new_v4());
		let workspace = WorkspaceDirectory
			.create(db.conn(), &owner, "Home")
			.await
			.unwrap();

		for workspace_id in [workspace.id, Uuid::new_v4()] {
			let err = TenantGuard
				.authorize(db.conn(), &stranger, workspace_id, Role::ReadOnly)
				.await
				.unwrap_err();
			assert!(matches!(err, InventoryError::NotAMember { .. }));
		}
	}
}
