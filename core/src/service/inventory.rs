//! Inventory service, the composition root
//!
//! Every call authorizes once with the role fixed for that operation, runs
//! its writes in a single transaction, records the outcome in the audit log
//! and publishes events only after commit.

use sea_orm::TransactionTrait;
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{
	AuditEntry, AuditTrail, BoxRegistry, LocationHierarchy, QrCodeLedger, TenantGuard,
	WorkspaceAccess, WorkspaceDirectory,
};
use crate::{
	config::{app_config::SearchConfig, AppConfig},
	domain::{
		BoxDetails, BoxSearch, BoxUpdate, Location, LocationDetails, Member, NewBox, Page,
		Principal, QrCode, QrStatus, RandomShortCodes, Role, ShortCodeSource, StorageBox,
		Workspace, WorkspaceMembership,
	},
	error::{InventoryError, InventoryResult},
	infra::{
		db::Database,
		event::{Event, EventBus, ResourceType},
	},
};

pub struct InventoryService {
	db: Database,
	guard: TenantGuard,
	directory: WorkspaceDirectory,
	locations: LocationHierarchy,
	ledger: QrCodeLedger,
	boxes: BoxRegistry,
	audit: AuditTrail,
	events: EventBus,
	search: SearchConfig,
}

impl InventoryService {
	pub fn new(db: Database) -> Self {
		Self::with_short_codes(db, Arc::new(RandomShortCodes))
	}

	/// Use a specific short-code generator for QR codes and boxes
	pub fn with_short_codes(db: Database, codes: Arc<dyn ShortCodeSource>) -> Self {
		let locations = LocationHierarchy;
		let ledger = QrCodeLedger::new(codes.clone());
		let boxes = BoxRegistry::new(locations, ledger.clone(), codes);

		Self {
			db,
			guard: TenantGuard,
			directory: WorkspaceDirectory,
			locations,
			ledger,
			boxes,
			audit: AuditTrail,
			events: EventBus::default(),
			search: SearchConfig::default(),
		}
	}

	pub fn with_search_config(mut self, search: SearchConfig) -> Self {
		self.search = search;
		self
	}

	/// Open (or create) the database described by `config` and migrate it
	pub async fn open(config: &AppConfig) -> InventoryResult<Self> {
		let db = Database::create(&config.database_path(), config.max_connections).await?;
		db.migrate().await?;

		Ok(Self::new(db).with_search_config(config.search))
	}

	pub fn database(&self) -> &Database {
		&self.db
	}

	pub fn events(&self) -> &EventBus {
		&self.events
	}

	async fn authorize(
		&self,
		principal: &Principal,
		workspace_id: Uuid,
		required: Role,
	) -> InventoryResult<WorkspaceAccess> {
		self.guard
			.authorize(self.db.conn(), principal, workspace_id, required)
			.await
	}

	/// Wrap an authorized mutation in its audit entry
	async fn audited<T, F>(&self, access: &WorkspaceAccess, action: &str, op: F) -> InventoryResult<T>
	where
		F: Future<Output = InventoryResult<T>>,
	{
		let entry = self.audit.begin(self.db.conn(), access, action).await?;
		let result = op.await;

		let failure = result.as_ref().err().map(InventoryError::code);
		if let Err(e) = self.audit.finish(self.db.conn(), entry, failure).await {
			error!(action, "Failed to finalize audit entry: {e:?}");
		}

		match &result {
			Ok(_) => info!(
				action,
				workspace_id = %access.workspace_id(),
				principal_id = %access.principal_id(),
				"Action completed"
			),
			Err(InventoryError::Database(e)) => error!(action, "Action failed in storage: {e}"),
			Err(e) => warn!(action, code = %e.code(), "Action rejected: {e}"),
		}

		result
	}

	// Workspaces

	pub async fn create_workspace(
		&self,
		principal: &Principal,
		name: &str,
	) -> InventoryResult<Workspace> {
		let txn = self.db.conn().begin().await?;
		let workspace = self.directory.create(&txn, principal, name).await?;
		txn.commit().await?;

		self.events.emit(Event::changed(
			workspace.id,
			ResourceType::Workspace,
			workspace.id,
		));
		Ok(workspace)
	}

	pub async fn list_workspaces_for(
		&self,
		principal: &Principal,
	) -> InventoryResult<Vec<WorkspaceMembership>> {
		self.directory.list_for(self.db.conn(), principal).await
	}

	pub async fn get_workspace(
		&self,
		principal: &Principal,
		workspace_id: Uuid,
	) -> InventoryResult<Workspace> {
		let access = self
			.authorize(principal, workspace_id, Role::ReadOnly)
			.await?;
		self.directory.get(self.db.conn(), &access).await
	}

	pub async fn rename_workspace(
		&self,
		principal: &Principal,
		workspace_id: Uuid,
		name: &str,
	) -> InventoryResult<Workspace> {
		let access = self.authorize(principal, workspace_id, Role::Admin).await?;
		let workspace = self
			.audited(&access, "workspace.rename", async {
				let txn = self.db.conn().begin().await?;
				let workspace = self.directory.rename(&txn, &access, name).await?;
				txn.commit().await?;
				Ok::<_, InventoryError>(workspace)
			})
			.await?;

		self.events.emit(Event::changed(
			workspace_id,
			ResourceType::Workspace,
			workspace_id,
		));
		Ok(workspace)
	}

	pub async fn delete_workspace(
		&self,
		principal: &Principal,
		workspace_id: Uuid,
	) -> InventoryResult<()> {
		let access = self.authorize(principal, workspace_id, Role::Owner).await?;
		self.audited(&access, "workspace.delete", async {
			let txn = self.db.conn().begin().await?;
			self.directory.delete(&txn, &access).await?;
			txn.commit().await?;
			Ok::<_, InventoryError>(())
		})
		.await?;

		self.events.emit(Event::WorkspaceDeleted { workspace_id });
		Ok(())
	}

	pub async fn list_members(
		&self,
		principal: &Principal,
		workspace_id: Uuid,
	) -> InventoryResult<Vec<Member>> {
		let access = self
			.authorize(principal, workspace_id, Role::ReadOnly)
			.await?;
		self.directory.list_members(self.db.conn(), &access).await
	}

	pub async fn add_member(
		&self,
		principal: &Principal,
		workspace_id: Uuid,
		member_id: Uuid,
		role: Role,
	) -> InventoryResult<Member> {
		let access = self.authorize(principal, workspace_id, Role::Admin).await?;
		let member = self
			.audited(&access, "member.add", async {
				let txn = self.db.conn().begin().await?;
				let member = self
					.directory
					.add_member(&txn, &access, member_id, role)
					.await?;
				txn.commit().await?;
				Ok::<_, InventoryError>(member)
			})
			.await?;

		self.events
			.emit(Event::changed(workspace_id, ResourceType::Member, member_id));
		Ok(member)
	}

	pub async fn change_member_role(
		&self,
		principal: &Principal,
		workspace_id: Uuid,
		member_id: Uuid,
		role: Role,
	) -> InventoryResult<Member> {
		let access = self.authorize(principal, workspace_id, Role::Admin).await?;
		let member = self
			.audited(&access, "member.change_role", async {
				let txn = self.db.conn().begin().await?;
				let member = self
					.directory
					.change_member_role(&txn, &access, member_id, role)
					.await?;
				txn.commit().await?;
				Ok::<_, InventoryError>(member)
			})
			.await?;

		self.events
			.emit(Event::changed(workspace_id, ResourceType::Member, member_id));
		Ok(member)
	}

	pub async fn remove_member(
		&self,
		principal: &Principal,
		workspace_id: Uuid,
		member_id: Uuid,
	) -> InventoryResult<()> {
		let access = self.authorize(principal, workspace_id, Role::Admin).await?;
		self.audited(&access, "member.remove", async {
			let txn = self.db.conn().begin().await?;
			self.directory
				.remove_member(&txn, &access, member_id)
				.await?;
			txn.commit().await?;
			Ok::<_, InventoryError>(())
		})
		.await?;

		self.events
			.emit(Event::deleted(workspace_id, ResourceType::Member, member_id));
		Ok(())
	}

	pub async fn list_audit_log(
		&self,
		principal: &Principal,
		workspace_id: Uuid,
		limit: u64,
	) -> InventoryResult<Vec<AuditEntry>> {
		let access = self.authorize(principal, workspace_id, Role::Admin).await?;
		self.audit.list(self.db.conn(), &access, limit).await
	}

	// Locations

	pub async fn create_location(
		&self,
		principal: &Principal,
		workspace_id: Uuid,
		parent_id: Option<Uuid>,
		name: &str,
	) -> InventoryResult<Location> {
		let access = self.authorize(principal, workspace_id, Role::Member).await?;
		let location = self
			.audited(&access, "location.create", async {
				let txn = self.db.conn().begin().await?;
				let location = self
					.locations
					.create(&txn, &access, parent_id, name)
					.await?;
				txn.commit().await?;
				Ok::<_, InventoryError>(location)
			})
			.await?;

		self.events.emit(Event::changed(
			workspace_id,
			ResourceType::Location,
			location.id,
		));
		Ok(location)
	}

	pub async fn rename_location(
		&self,
		principal: &Principal,
		workspace_id: Uuid,
		location_id: Uuid,
		name: &str,
	) -> InventoryResult<Location> {
		let access = self.authorize(principal, workspace_id, Role::Member).await?;
		let location = self
			.audited(&access, "location.rename", async {
				let txn = self.db.conn().begin().await?;
				let location = self
					.locations
					.rename(&txn, &access, location_id, name)
					.await?;
				txn.commit().await?;
				Ok::<_, InventoryError>(location)
			})
			.await?;

		self.events.emit(Event::changed(
			workspace_id,
			ResourceType::Location,
			location_id,
		));
		Ok(location)
	}

	/// Tombstone the location and its subtree; boxes inside become unassigned
	pub async fn soft_delete_location(
		&self,
		principal: &Principal,
		workspace_id: Uuid,
		location_id: Uuid,
	) -> InventoryResult<()> {
		let access = self.authorize(principal, workspace_id, Role::Admin).await?;
		let outcome = self
			.audited(&access, "location.soft_delete", async {
				let txn = self.db.conn().begin().await?;
				let outcome = self
					.locations
					.soft_delete(&txn, &access, location_id)
					.await?;
				txn.commit().await?;
				Ok::<_, InventoryError>(outcome)
			})
			.await?;

		for id in outcome.location_ids {
			self.events
				.emit(Event::deleted(workspace_id, ResourceType::Location, id));
		}
		Ok(())
	}

	pub async fn list_locations(
		&self,
		principal: &Principal,
		workspace_id: Uuid,
		parent_id: Option<Uuid>,
	) -> InventoryResult<Vec<Location>> {
		let access = self
			.authorize(principal, workspace_id, Role::ReadOnly)
			.await?;
		self.locations
			.list_children(self.db.conn(), &access, parent_id)
			.await
	}

	pub async fn get_location(
		&self,
		principal: &Principal,
		workspace_id: Uuid,
		location_id: Uuid,
	) -> InventoryResult<LocationDetails> {
		let access = self
			.authorize(principal, workspace_id, Role::ReadOnly)
			.await?;
		self.locations
			.get(self.db.conn(), &access, location_id)
			.await
	}

	// Boxes

	pub async fn create_box(
		&self,
		principal: &Principal,
		workspace_id: Uuid,
		new: NewBox,
	) -> InventoryResult<StorageBox> {
		let access = self.authorize(principal, workspace_id, Role::Member).await?;
		let qr_code_id = new.qr_code_id;
		let created = self
			.audited(&access, "box.create", async {
				let txn = self.db.conn().begin().await?;
				let created = self.boxes.create(&txn, &access, new).await?;
				txn.commit().await?;
				Ok::<_, InventoryError>(created)
			})
			.await?;

		self.events
			.emit(Event::changed(workspace_id, ResourceType::Box, created.id));
		if let Some(qr_code_id) = qr_code_id {
			self.events
				.emit(Event::changed(workspace_id, ResourceType::QrCode, qr_code_id));
		}
		Ok(created)
	}

	pub async fn move_box(
		&self,
		principal: &Principal,
		workspace_id: Uuid,
		box_id: Uuid,
		location_id: Option<Uuid>,
	) -> InventoryResult<StorageBox> {
		let access = self.authorize(principal, workspace_id, Role::Member).await?;
		let moved = self
			.audited(&access, "box.move", async {
				let txn = self.db.conn().begin().await?;
				let moved = self
					.boxes
					.move_to(&txn, &access, box_id, location_id)
					.await?;
				txn.commit().await?;
				Ok::<_, InventoryError>(moved)
			})
			.await?;

		self.events
			.emit(Event::changed(workspace_id, ResourceType::Box, box_id));
		Ok(moved)
	}

	pub async fn rename_or_retag(
		&self,
		principal: &Principal,
		workspace_id: Uuid,
		box_id: Uuid,
		update: BoxUpdate,
	) -> InventoryResult<StorageBox> {
		let access = self.authorize(principal, workspace_id, Role::Member).await?;
		let updated = self
			.audited(&access, "box.update", async {
				let txn = self.db.conn().begin().await?;
				let updated = self
					.boxes
					.rename_or_retag(&txn, &access, box_id, update)
					.await?;
				txn.commit().await?;
				Ok::<_, InventoryError>(updated)
			})
			.await?;

		self.events
			.emit(Event::changed(workspace_id, ResourceType::Box, box_id));
		Ok(updated)
	}

	pub async fn assign_qr_code(
		&self,
		principal: &Principal,
		workspace_id: Uuid,
		box_id: Uuid,
		qr_code_id: Uuid,
	) -> InventoryResult<QrCode> {
		let access = self.authorize(principal, workspace_id, Role::Member).await?;
		let code = self
			.audited(&access, "box.assign_qr_code", async {
				let txn = self.db.conn().begin().await?;
				let code = self
					.boxes
					.assign_qr_code(&txn, &access, box_id, qr_code_id)
					.await?;
				txn.commit().await?;
				Ok::<_, InventoryError>(code)
			})
			.await?;

		self.events
			.emit(Event::changed(workspace_id, ResourceType::Box, box_id));
		self.events
			.emit(Event::changed(workspace_id, ResourceType::QrCode, qr_code_id));
		Ok(code)
	}

	/// Destroy a box; its QR code returns to `generated`
	pub async fn delete_box(
		&self,
		principal: &Principal,
		workspace_id: Uuid,
		box_id: Uuid,
	) -> InventoryResult<()> {
		let access = self.authorize(principal, workspace_id, Role::Admin).await?;
		let released = self
			.audited(&access, "box.delete", async {
				let txn = self.db.conn().begin().await?;
				let released = self.boxes.delete(&txn, &access, box_id).await?;
				txn.commit().await?;
				Ok::<_, InventoryError>(released)
			})
			.await?;

		self.events
			.emit(Event::deleted(workspace_id, ResourceType::Box, box_id));
		if let Some(qr_code_id) = released {
			self.events
				.emit(Event::changed(workspace_id, ResourceType::QrCode, qr_code_id));
		}
		Ok(())
	}

	pub async fn get_box(
		&self,
		principal: &Principal,
		workspace_id: Uuid,
		box_id: Uuid,
	) -> InventoryResult<BoxDetails> {
		let access = self
			.authorize(principal, workspace_id, Role::ReadOnly)
			.await?;
		self.boxes.get(self.db.conn(), &access, box_id).await
	}

	pub async fn search_boxes(
		&self,
		principal: &Principal,
		workspace_id: Uuid,
		search: &BoxSearch,
	) -> InventoryResult<Page<StorageBox>> {
		let access = self
			.authorize(principal, workspace_id, Role::ReadOnly)
			.await?;
		let page_size = self.search.clamp_page_size(search.page_size);
		self.boxes
			.search(self.db.conn(), &access, search, page_size)
			.await
	}

	// QR codes

	pub async fn generate_qr_batch(
		&self,
		principal: &Principal,
		workspace_id: Uuid,
		quantity: i64,
	) -> InventoryResult<Vec<QrCode>> {
		let access = self.authorize(principal, workspace_id, Role::Member).await?;
		let codes = self
			.audited(&access, "qr_code.generate_batch", async {
				let txn = self.db.conn().begin().await?;
				let codes = self
					.ledger
					.generate_batch(&txn, &access, quantity)
					.await?;
				txn.commit().await?;
				Ok::<_, InventoryError>(codes)
			})
			.await?;

		for code in &codes {
			self.events
				.emit(Event::changed(workspace_id, ResourceType::QrCode, code.id));
		}
		Ok(codes)
	}

	/// Look a scanned code up and check the caller belongs to its workspace.
	///
	/// Outsiders get `NotAMember` for the code's workspace, reported as
	/// `not_found` like an unknown code.
	pub async fn resolve_qr_code(
		&self,
		principal: &Principal,
		short_code: &str,
	) -> InventoryResult<QrCode> {
		let code = self.ledger.resolve(self.db.conn(), short_code).await?;
		self.authorize(principal, code.workspace_id, Role::ReadOnly)
			.await?;
		Ok(code)
	}

	pub async fn list_qr_codes(
		&self,
		principal: &Principal,
		workspace_id: Uuid,
		status: Option<QrStatus>,
	) -> InventoryResult<Vec<QrCode>> {
		let access = self
			.authorize(principal, workspace_id, Role::ReadOnly)
			.await?;
		self.ledger.list(self.db.conn(), &access, status).await
	}
}
