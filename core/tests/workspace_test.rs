//! Workspace lifecycle, membership, audit and event tests

mod helpers;

use bk_core::{
	domain::{NewBox, Role},
	infra::db::entities::{audit_log::ActionStatus, Location, QrCode, StorageBox},
	AppConfig, ErrorCode, Event, InventoryService, ResourceType,
};
use helpers::{principal, TestInventory};
use sea_orm::{EntityTrait, PaginatorTrait};
use tempfile::TempDir;

#[tokio::test]
async fn creator_owns_new_workspace() {
	let t = TestInventory::new().await;

	let memberships = t.service.list_workspaces_for(&t.owner).await.unwrap();
	assert_eq!(memberships.len(), 1);
	assert_eq!(memberships[0].workspace.id, t.workspace_id());
	assert_eq!(memberships[0].role, Role::Owner);
	assert_eq!(memberships[0].workspace.owner_id, t.owner.id);

	assert!(t
		.service
		.list_workspaces_for(&principal())
		.await
		.unwrap()
		.is_empty());
}

#[tokio::test]
async fn last_owner_is_protected_from_demotion_and_removal() {
	let t = TestInventory::new().await;
	let ws = t.workspace_id();

	let err = t
		.service
		.change_member_role(&t.owner, ws, t.owner.id, Role::Admin)
		.await
		.unwrap_err();
	assert_eq!(err.code(), ErrorCode::LastOwnerProtected);

	let err = t
		.service
		.remove_member(&t.owner, ws, t.owner.id)
		.await
		.unwrap_err();
	assert_eq!(err.code(), ErrorCode::LastOwnerProtected);

	let members = t.service.list_members(&t.owner, ws).await.unwrap();
	assert_eq!(members.len(), 1);
	assert_eq!(members[0].role, Role::Owner);
}

#[tokio::test]
async fn admins_cannot_touch_owners() {
	let t = TestInventory::new().await;
	let ws = t.workspace_id();
	let admin = t.join(Role::Admin).await;

	let err = t
		.service
		.add_member(&admin, ws, principal().id, Role::Owner)
		.await
		.unwrap_err();
	assert_eq!(err.code(), ErrorCode::InsufficientRole);

	let err = t
		.service
		.remove_member(&admin, ws, t.owner.id)
		.await
		.unwrap_err();
	assert_eq!(err.code(), ErrorCode::InsufficientRole);

	let viewer = t.join(Role::ReadOnly).await;
	let promoted = t
		.service
		.change_member_role(&admin, ws, viewer.id, Role::Member)
		.await
		.unwrap();
	assert_eq!(promoted.role, Role::Member);

	t.service.remove_member(&admin, ws, viewer.id).await.unwrap();
	let err = t
		.service
		.list_locations(&viewer, ws, None)
		.await
		.unwrap_err();
	assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn ownership_can_be_handed_over() {
	let t = TestInventory::new().await;
	let ws = t.workspace_id();
	let heir = t.join(Role::Admin).await;

	t.service
		.change_member_role(&t.owner, ws, heir.id, Role::Owner)
		.await
		.unwrap();
	t.service
		.remove_member(&heir, ws, t.owner.id)
		.await
		.unwrap();

	let memberships = t.service.list_workspaces_for(&heir).await.unwrap();
	assert_eq!(memberships[0].role, Role::Owner);
	assert!(t
		.service
		.list_workspaces_for(&t.owner)
		.await
		.unwrap()
		.is_empty());
}

#[tokio::test]
async fn deleting_a_workspace_removes_everything_below_it() {
	let t = TestInventory::new().await;
	let ws = t.workspace_id();
	let other = t
		.service
		.create_workspace(&t.owner, "Office")
		.await
		.unwrap();

	let garage = t
		.service
		.create_location(&t.owner, ws, None, "Garage")
		.await
		.unwrap();
	t.service
		.create_location(&t.owner, ws, Some(garage.id), "Shelf")
		.await
		.unwrap();
	let codes = t.service.generate_qr_batch(&t.owner, ws, 2).await.unwrap();
	t.service
		.create_box(
			&t.owner,
			ws,
			NewBox::named("Tools")
				.in_location(garage.id)
				.with_qr_code(codes[0].id),
		)
		.await
		.unwrap();
	t.service
		.generate_qr_batch(&t.owner, other.id, 1)
		.await
		.unwrap();

	t.service.delete_workspace(&t.owner, ws).await.unwrap();

	let conn = t.service.database().conn();
	assert_eq!(Location::find().count(conn).await.unwrap(), 0);
	assert_eq!(StorageBox::find().count(conn).await.unwrap(), 0);
	assert_eq!(QrCode::find().count(conn).await.unwrap(), 1);

	let err = t
		.service
		.resolve_qr_code(&t.owner, &codes[1].short_code)
		.await
		.unwrap_err();
	assert_eq!(err.code(), ErrorCode::NotFound);

	let remaining = t.service.list_workspaces_for(&t.owner).await.unwrap();
	assert_eq!(remaining.len(), 1);
	assert_eq!(remaining[0].workspace.id, other.id);
}

#[tokio::test]
async fn audit_log_records_outcomes() {
	let t = TestInventory::new().await;
	let ws = t.workspace_id();

	t.service
		.create_location(&t.owner, ws, None, "Garage")
		.await
		.unwrap();
	t.service
		.create_location(&t.owner, ws, None, "Garage")
		.await
		.unwrap_err();

	let entries = t.service.list_audit_log(&t.owner, ws, 10).await.unwrap();
	assert_eq!(entries.len(), 2);
	assert!(entries.iter().all(|e| e.action == "location.create"));

	let failed = entries
		.iter()
		.find(|e| e.status == ActionStatus::Failed)
		.unwrap();
	assert_eq!(failed.error_code.as_deref(), Some("duplicate_sibling_name"));
	assert!(failed.completed_at.is_some());
	assert!(entries.iter().any(|e| e.status == ActionStatus::Completed));

	let member = t.join(Role::Member).await;
	let err = t
		.service
		.list_audit_log(&member, ws, 10)
		.await
		.unwrap_err();
	assert_eq!(err.code(), ErrorCode::InsufficientRole);
}

#[tokio::test]
async fn events_follow_committed_changes() {
	let t = TestInventory::new().await;
	let ws = t.workspace_id();
	let mut events = t.service.events().subscribe_workspace(ws);

	let attic = t
		.service
		.create_location(&t.owner, ws, None, "Attic")
		.await
		.unwrap();
	match events.try_recv().unwrap() {
		Event::ResourceChanged {
			resource_type,
			resource_id,
			..
		} => {
			assert_eq!(resource_type, ResourceType::Location);
			assert_eq!(resource_id, attic.id);
		}
		other => panic!("unexpected event {other:?}"),
	}

	// Rejected calls publish nothing
	t.service
		.create_location(&t.owner, ws, None, "Attic")
		.await
		.unwrap_err();
	assert!(events.try_recv().is_err());

	t.service
		.soft_delete_location(&t.owner, ws, attic.id)
		.await
		.unwrap();
	assert!(matches!(
		events.try_recv().unwrap(),
		Event::ResourceDeleted {
			resource_type: ResourceType::Location,
			..
		}
	));
}

#[tokio::test]
async fn on_disk_store_survives_reopen() {
	let dir = TempDir::new().unwrap();
	let config = AppConfig::load_from(dir.path()).unwrap();
	let owner = principal();

	let workspace = {
		let service = InventoryService::open(&config).await.unwrap();
		let workspace = service.create_workspace(&owner, "Garage").await.unwrap();
		service
			.create_box(&owner, workspace.id, NewBox::named("Bikes"))
			.await
			.unwrap();
		workspace
	};

	let reopened = InventoryService::open(&config).await.unwrap();
	let page = reopened
		.search_boxes(&owner, workspace.id, &Default::default())
		.await
		.unwrap();
	assert_eq!(page.total_items, 1);
	assert_eq!(page.items[0].name, "Bikes");
	assert!(config.database_path().exists());
}
