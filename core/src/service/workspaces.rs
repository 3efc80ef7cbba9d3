//! Workspaces and their memberships

use chrono::Utc;
use sea_orm::{
	ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
	QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{is_unique_violation, WorkspaceAccess};
use crate::{
	domain::{storage_box::validate_name, Member, Principal, Role, Workspace, WorkspaceMembership},
	error::{EntityKind, InventoryError, InventoryResult},
	infra::db::entities::{
		location, qr_code, storage_box, workspace, workspace_member, Location, QrCode, StorageBox,
		WorkspaceActive, WorkspaceMember, WorkspaceMemberActive,
	},
};

#[derive(Debug, Default, Clone, Copy)]
pub struct WorkspaceDirectory;

impl WorkspaceDirectory {
	/// Create a workspace owned by `principal`
	pub async fn create<C: ConnectionTrait>(
		&self,
		db: &C,
		principal: &Principal,
		name: &str,
	) -> InventoryResult<Workspace> {
		let name = validate_name("name", name)?;
		let now = Utc::now();

		let model = WorkspaceActive {
			id: Set(Uuid::new_v4()),
			name: Set(name),
			owner_id: Set(principal.id),
			created_at: Set(now),
			updated_at: Set(now),
		}
		.insert(db)
		.await?;

		WorkspaceMemberActive {
			workspace_id: Set(model.id),
			principal_id: Set(principal.id),
			role: Set(Role::Owner),
			joined_at: Set(now),
		}
		.insert(db)
		.await?;

		info!(workspace_id = %model.id, owner_id = %principal.id, "Created workspace");
		Ok(model.to_domain())
	}

	pub async fn get<C: ConnectionTrait>(
		&self,
		db: &C,
		access: &WorkspaceAccess,
	) -> InventoryResult<Workspace> {
		workspace::Entity::find_by_id(access.workspace_id())
			.one(db)
			.await?
			.map(|m| m.to_domain())
			.ok_or_else(|| InventoryError::not_found(EntityKind::Workspace, access.workspace_id()))
	}

	pub async fn rename<C: ConnectionTrait>(
		&self,
		db: &C,
		access: &WorkspaceAccess,
		name: &str,
	) -> InventoryResult<Workspace> {
		let name = validate_name("name", name)?;
		let model = workspace::Entity::find_by_id(access.workspace_id())
			.one(db)
			.await?
			.ok_or_else(|| InventoryError::not_found(EntityKind::Workspace, access.workspace_id()))?;

		let mut active: WorkspaceActive = model.into();
		active.name = Set(name);
		active.updated_at = Set(Utc::now());
		let model = active.update(db).await?;

		Ok(model.to_domain())
	}

	/// Remove the workspace and every row scoped to it.
	///
	/// Children are removed explicitly in dependency order; the foreign key
	/// cascades only back this up.
	pub async fn delete<C: ConnectionTrait>(
		&self,
		db: &C,
		access: &WorkspaceAccess,
	) -> InventoryResult<()> {
		let workspace_id = access.workspace_id();

		let qr_codes = QrCode::delete_many()
			.filter(qr_code::Column::WorkspaceId.eq(workspace_id))
			.exec(db)
			.await?
			.rows_affected;
		let boxes = StorageBox::delete_many()
			.filter(storage_box::Column::WorkspaceId.eq(workspace_id))
			.exec(db)
			.await?
			.rows_affected;
		let locations = Location::delete_many()
			.filter(location::Column::WorkspaceId.eq(workspace_id))
			.exec(db)
			.await?
			.rows_affected;
		WorkspaceMember::delete_many()
			.filter(workspace_member::Column::WorkspaceId.eq(workspace_id))
			.exec(db)
			.await?;

		let deleted = workspace::Entity::delete_by_id(workspace_id)
			.exec(db)
			.await?
			.rows_affected;
		if deleted == 0 {
			return Err(InventoryError::not_found(EntityKind::Workspace, workspace_id));
		}

		info!(
			%workspace_id,
			qr_codes, boxes, locations, "Deleted workspace"
		);
		Ok(())
	}

	/// Every workspace `principal` belongs to, sorted by name
	pub async fn list_for<C: ConnectionTrait>(
		&self,
		db: &C,
		principal: &Principal,
	) -> InventoryResult<Vec<WorkspaceMembership>> {
		let rows = WorkspaceMember::find()
			.filter(workspace_member::Column::PrincipalId.eq(principal.id))
			.find_also_related(workspace::Entity)
			.all(db)
			.await?;

		let mut memberships: Vec<WorkspaceMembership> = rows
			.into_iter()
			.filter_map(|(member, workspace)| {
				workspace.map(|w| WorkspaceMembership {
					workspace: w.to_domain(),
					role: member.role,
				})
			})
			.collect();
		memberships.sort_by(|a, b| {
			a.workspace
				.name
				.cmp(&b.workspace.name)
				.then(a.workspace.id.cmp(&b.workspace.id))
		});

		Ok(memberships)
	}

	pub async fn list_members<C: ConnectionTrait>(
		&self,
		db: &C,
		access: &WorkspaceAccess,
	) -> InventoryResult<Vec<Member>> {
		let members = WorkspaceMember::find()
			.filter(workspace_member::Column::WorkspaceId.eq(access.workspace_id()))
			.order_by_asc(workspace_member::Column::JoinedAt)
			.order_by_asc(workspace_member::Column::PrincipalId)
			.all(db)
			.await?;

		Ok(members.iter().map(workspace_member::Model::to_domain).collect())
	}

	/// Granting `owner` requires the caller to be an owner
	pub async fn add_member<C: ConnectionTrait>(
		&self,
		db: &C,
		access: &WorkspaceAccess,
		principal_id: Uuid,
		role: Role,
	) -> InventoryResult<Member> {
		if role == Role::Owner {
			access.require(Role::Owner)?;
		}

		let existing = WorkspaceMember::find_by_id((access.workspace_id(), principal_id))
			.one(db)
			.await?;
		if existing.is_some() {
			return Err(InventoryError::invalid_input(
				"principal_id",
				"already a member of this workspace",
			));
		}

		let model = WorkspaceMemberActive {
			workspace_id: Set(access.workspace_id()),
			principal_id: Set(principal_id),
			role: Set(role),
			joined_at: Set(Utc::now()),
		}
		.insert(db)
		.await
		.map_err(|e| {
			if is_unique_violation(&e) {
				InventoryError::invalid_input("principal_id", "already a member of this workspace")
			} else {
				e.into()
			}
		})?;

		info!(workspace_id = %access.workspace_id(), %principal_id, %role, "Added member");
		Ok(model.to_domain())
	}

	/// Change a member's role; owners can only be touched by owners
	pub async fn change_member_role<C: ConnectionTrait>(
		&self,
		db: &C,
		access: &WorkspaceAccess,
		principal_id: Uuid,
		role: Role,
	) -> InventoryResult<Member> {
		let member = self.member(db, access, principal_id).await?;
		if role == Role::Owner || member.role == Role::Owner {
			access.require(Role::Owner)?;
		}
		if member.role == role {
			debug!(%principal_id, %role, "Role unchanged");
			return Ok(member.to_domain());
		}
		if member.role == Role::Owner {
			self.ensure_other_owner(db, access).await?;
		}

		let mut active: WorkspaceMemberActive = member.into();
		active.role = Set(role);
		let model = active.update(db).await?;

		info!(workspace_id = %access.workspace_id(), %principal_id, %role, "Changed member role");
		Ok(model.to_domain())
	}

	pub async fn remove_member<C: ConnectionTrait>(
		&self,
		db: &C,
		access: &WorkspaceAccess,
		principal_id: Uuid,
	) -> InventoryResult<()> {
		let member = self.member(db, access, principal_id).await?;
		if member.role == Role::Owner {
			access.require(Role::Owner)?;
			self.ensure_other_owner(db, access).await?;
		}

		member.delete(db).await?;

		info!(workspace_id = %access.workspace_id(), %principal_id, "Removed member");
		Ok(())
	}

	async fn member<C: ConnectionTrait>(
		&self,
		db: &C,
		access: &WorkspaceAccess,
		principal_id: Uuid,
	) -> InventoryResult<workspace_member::Model> {
		WorkspaceMember::find_by_id((access.workspace_id(), principal_id))
			.one(db)
			.await?
			.ok_or_else(|| InventoryError::not_found(EntityKind::Member, principal_id))
	}

	async fn ensure_other_owner<C: ConnectionTrait>(
		&self,
		db: &C,
		access: &WorkspaceAccess,
	) -> InventoryResult<()> {
		let owners = WorkspaceMember::find()
			.filter(workspace_member::Column::WorkspaceId.eq(access.workspace_id()))
			.filter(workspace_member::Column::Role.eq(Role::Owner))
			.count(db)
			.await?;

		if owners <= 1 {
			warn!(workspace_id = %access.workspace_id(), "Refused to drop the last owner");
			return Err(InventoryError::LastOwnerProtected {
				workspace_id: access.workspace_id(),
			});
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{infra::db::Database, service::TenantGuard};

	async fn setup() -> (Database, Principal, WorkspaceAccess) {
		let db = Database::memory().await.unwrap();
		let owner = Principal::new(Uuid::new_v4());
		let workspace = WorkspaceDirectory
			.create(db.conn(), &owner, "Home")
			.await
			.unwrap();
		let access = TenantGuard
			.authorize(db.conn(), &owner, workspace.id, Role::Owner)
			.await
			.unwrap();
		(db, owner, access)
	}

	#[tokio::test]
	async fn sole_owner_cannot_demote_or_remove_self() {
		let (db, owner, access) = setup().await;

		let err = WorkspaceDirectory
			.change_member_role(db.conn(), &access, owner.id, Role::Admin)
			.await
			.unwrap_err();
		assert!(matches!(err, InventoryError::LastOwnerProtected { .. }));

		let err = WorkspaceDirectory
			.remove_member(db.conn(), &access, owner.id)
			.await
			.unwrap_err();
		assert!(matches!(err, InventoryError::LastOwnerProtected { .. }));
	}

	#[tokio::test]
	async fn second_owner_unlocks_demotion() {
		let (db, owner, access) = setup().await;
		let co_owner = Uuid::new_v4();

		WorkspaceDirectory
			.add_member(db.conn(), &access, co_owner, Role::Owner)
			.await
			.unwrap();
		let demoted = WorkspaceDirectory
			.change_member_role(db.conn(), &access, owner.id, Role::Admin)
			.await
			.unwrap();

		assert_eq!(demoted.role, Role::Admin);
	}

	#[tokio::test]
	async fn duplicate_membership_is_rejected() {
		let (db, _owner, access) = setup().await;
		let friend = Uuid::new_v4();

		WorkspaceDirectory
			.add_member(db.conn(), &access, friend, Role::Member)
			.await
			.unwrap();
		let err = WorkspaceDirectory
			.add_member(db.conn(), &access, friend, Role::ReadOnly)
			.await
			.unwrap_err();

		assert!(matches!(err, InventoryError::InvalidInput { field: "principal_id", .. }));
		assert_eq!(
			WorkspaceDirectory
				.list_members(db.conn(), &access)
				.await
				.unwrap()
				.len(),
			2
		);
	}
}
