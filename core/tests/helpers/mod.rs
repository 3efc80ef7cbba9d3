//! Shared setup for inventory integration tests

#![allow(dead_code)]

use bk_core::{
	domain::{Principal, QrStatus, Role, Workspace},
	infra::db::entities::QrCode,
	Database, InventoryService,
};
use sea_orm::EntityTrait;
use uuid::Uuid;

pub struct TestInventory {
	pub service: InventoryService,
	pub owner: Principal,
	pub workspace: Workspace,
}

impl TestInventory {
	/// Fresh in-memory store with one workspace owned by `owner`
	pub async fn new() -> Self {
		let db = Database::memory().await.expect("in-memory database");
		let service = InventoryService::new(db);
		let owner = principal();
		let workspace = service
			.create_workspace(&owner, "Home")
			.await
			.expect("create workspace");

		Self {
			service,
			owner,
			workspace,
		}
	}

	pub fn workspace_id(&self) -> Uuid {
		self.workspace.id
	}

	/// Add a new principal to the workspace with `role`
	pub async fn join(&self, role: Role) -> Principal {
		let member = principal();
		self.service
			.add_member(&self.owner, self.workspace.id, member.id, role)
			.await
			.expect("add member");
		member
	}

	/// `status = assigned` iff `box_id` is set, for every stored code
	pub async fn assert_qr_invariant(&self) {
		let rows = QrCode::find()
			.all(self.service.database().conn())
			.await
			.expect("load qr codes");
		for row in rows {
			assert_eq!(
				row.status == QrStatus::Assigned,
				row.box_id.is_some(),
				"QR code {} has status {:?} with box {:?}",
				row.short_code,
				row.status,
				row.box_id
			);
		}
	}
}

pub fn principal() -> Principal {
	Principal::new(Uuid::new_v4())
}
