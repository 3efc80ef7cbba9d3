//! Box registry

use chrono::Utc;
use sea_orm::{
	sea_query::{Condition, Expr, LikeExpr},
	ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
	QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{is_unique_violation, LocationHierarchy, QrCodeLedger, WorkspaceAccess};
use crate::{
	domain::{
		short_code::{BOX_CODE_LEN, MAX_CODE_ATTEMPTS},
		storage_box::{normalize_tags, validate_description, validate_name},
		BoxDetails, BoxSearch, BoxUpdate, LocationFilter, NewBox, Page, QrCode, RandomShortCodes,
		ShortCodeSource, StorageBox,
	},
	error::{EntityKind, InventoryError, InventoryResult},
	infra::db::entities::{location, storage_box, StorageBoxActive},
};

#[derive(Clone)]
pub struct BoxRegistry {
	locations: LocationHierarchy,
	ledger: QrCodeLedger,
	codes: Arc<dyn ShortCodeSource>,
}

impl Default for BoxRegistry {
	fn default() -> Self {
		let codes: Arc<dyn ShortCodeSource> = Arc::new(RandomShortCodes);
		Self::new(
			LocationHierarchy,
			QrCodeLedger::new(codes.clone()),
			codes,
		)
	}
}

impl std::fmt::Debug for BoxRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BoxRegistry").finish_non_exhaustive()
	}
}

impl BoxRegistry {
	pub fn new(
		locations: LocationHierarchy,
		ledger: QrCodeLedger,
		codes: Arc<dyn ShortCodeSource>,
	) -> Self {
		Self {
			locations,
			ledger,
			codes,
		}
	}

	/// Create a box, optionally placed and optionally claiming a QR code.
	///
	/// Must run inside a transaction: a failed claim rolls the insert back.
	pub async fn create<C: ConnectionTrait>(
		&self,
		db: &C,
		access: &WorkspaceAccess,
		new: NewBox,
	) -> InventoryResult<StorageBox> {
		let workspace_id = access.workspace_id();
		let name = validate_name("name", &new.name)?;
		let description = validate_description(new.description.as_deref())?;
		let tags = normalize_tags(&new.tags)?;

		if let Some(location_id) = new.location_id {
			self.locations
				.live_location_in(db, workspace_id, location_id)
				.await?;
		}

		let model = self
			.insert_with_unique_code(db, workspace_id, |code| {
				let now = Utc::now();
				StorageBoxActive {
					id: Set(Uuid::new_v4()),
					workspace_id: Set(workspace_id),
					location_id: Set(new.location_id),
					short_code: Set(code),
					name: Set(name.clone()),
					description: Set(description.clone()),
					name_folded: Set(storage_box::fold_case(&name)),
					description_folded: Set(description.as_deref().map(storage_box::fold_case)),
					tags: Set(storage_box::encode_tags(&tags)),
					created_at: Set(now),
					updated_at: Set(now),
				}
			})
			.await?;

		if let Some(qr_code_id) = new.qr_code_id {
			self.ledger
				.assign(db, workspace_id, qr_code_id, model.id)
				.await?;
		}

		info!(
			%workspace_id,
			box_id = %model.id,
			short_code = %model.short_code,
			"Created box"
		);
		model.to_domain()
	}

	async fn insert_with_unique_code<C, F>(
		&self,
		db: &C,
		workspace_id: Uuid,
		build: F,
	) -> InventoryResult<storage_box::Model>
	where
		C: ConnectionTrait,
		F: Fn(String) -> StorageBoxActive,
	{
		for attempt in 1..=MAX_CODE_ATTEMPTS {
			let candidate = self.codes.next_code(BOX_CODE_LEN);
			match build(candidate.clone()).insert(db).await {
				Ok(model) => return Ok(model),
				Err(e) if is_unique_violation(&e) => {
					debug!(attempt, code = %candidate, "Box short code collision, retrying");
				}
				Err(e) => return Err(e.into()),
			}
		}

		warn!(%workspace_id, "Exhausted box short code attempts");
		Err(InventoryError::StorageUnavailable {
			reason: "could not allocate a unique short code",
		})
	}

	/// Place a box at a live location, or unassign it with `None`
	pub async fn move_to<C: ConnectionTrait>(
		&self,
		db: &C,
		access: &WorkspaceAccess,
		box_id: Uuid,
		location_id: Option<Uuid>,
	) -> InventoryResult<StorageBox> {
		let workspace_id = access.workspace_id();
		let current = self.box_in(db, workspace_id, box_id).await?;

		if let Some(location_id) = location_id {
			self.locations
				.live_location_in(db, workspace_id, location_id)
				.await?;
		}
		if current.location_id == location_id {
			return current.to_domain();
		}

		let mut active: StorageBoxActive = current.into();
		active.location_id = Set(location_id);
		active.updated_at = Set(Utc::now());
		let model = active.update(db).await?;

		info!(%workspace_id, %box_id, ?location_id, "Moved box");
		model.to_domain()
	}

	pub async fn rename_or_retag<C: ConnectionTrait>(
		&self,
		db: &C,
		access: &WorkspaceAccess,
		box_id: Uuid,
		update: BoxUpdate,
	) -> InventoryResult<StorageBox> {
		if update.is_empty() {
			return Err(InventoryError::invalid_input("update", "nothing to change"));
		}

		let current = self.box_in(db, access.workspace_id(), box_id).await?;
		let mut active: StorageBoxActive = current.into();

		if let Some(name) = update.name {
			let name = validate_name("name", &name)?;
			active.name_folded = Set(storage_box::fold_case(&name));
			active.name = Set(name);
		}
		if let Some(description) = update.description {
			let description = validate_description(description.as_deref())?;
			active.description_folded = Set(description.as_deref().map(storage_box::fold_case));
			active.description = Set(description);
		}
		if let Some(tags) = update.tags {
			active.tags = Set(storage_box::encode_tags(&normalize_tags(&tags)?));
		}
		active.updated_at = Set(Utc::now());

		let model = active.update(db).await?;
		debug!(%box_id, "Updated box fields");
		model.to_domain()
	}

	/// Bind `qr_code_id` to an existing box, releasing the code it held before
	pub async fn assign_qr_code<C: ConnectionTrait>(
		&self,
		db: &C,
		access: &WorkspaceAccess,
		box_id: Uuid,
		qr_code_id: Uuid,
	) -> InventoryResult<QrCode> {
		let workspace_id = access.workspace_id();
		self.box_in(db, workspace_id, box_id).await?;

		if let Some(bound) = self.ledger.bound_to(db, workspace_id, box_id).await? {
			if bound.id == qr_code_id {
				return Ok(bound);
			}
			self.ledger.release(db, workspace_id, box_id).await?;
		}
		self.ledger
			.assign(db, workspace_id, qr_code_id, box_id)
			.await?;

		info!(%workspace_id, %box_id, %qr_code_id, "Relabelled box");
		self.ledger
			.bound_to(db, workspace_id, box_id)
			.await?
			.ok_or(InventoryError::StorageUnavailable {
				reason: "assigned QR code vanished",
			})
	}

	/// Destroy a box, first handing its QR code back to the pool.
	///
	/// Must run inside a transaction. Returns the released code id.
	pub async fn delete<C: ConnectionTrait>(
		&self,
		db: &C,
		access: &WorkspaceAccess,
		box_id: Uuid,
	) -> InventoryResult<Option<Uuid>> {
		let workspace_id = access.workspace_id();
		self.box_in(db, workspace_id, box_id).await?;

		let released = self.ledger.release(db, workspace_id, box_id).await?;
		storage_box::Entity::delete_by_id(box_id).exec(db).await?;

		info!(%workspace_id, %box_id, released_qr_code = ?released, "Deleted box");
		Ok(released)
	}

	/// A box with its placement and label
	pub async fn get<C: ConnectionTrait>(
		&self,
		db: &C,
		access: &WorkspaceAccess,
		box_id: Uuid,
	) -> InventoryResult<BoxDetails> {
		let workspace_id = access.workspace_id();
		let storage_box = self.box_in(db, workspace_id, box_id).await?.to_domain()?;

		let location = match storage_box.location_id {
			Some(location_id) => location::Entity::find_by_id(location_id)
				.one(db)
				.await?
				.map(|l| l.to_domain())
				.transpose()?,
			None => None,
		};
		let qr_code = self.ledger.bound_to(db, workspace_id, box_id).await?;

		Ok(BoxDetails {
			storage_box,
			location,
			qr_code,
		})
	}

	/// Case-insensitive substring search over name, description, short code
	/// and individual tags. Pages are 1-based; `page_size` is already clamped.
	pub async fn search<C: ConnectionTrait>(
		&self,
		db: &C,
		access: &WorkspaceAccess,
		search: &BoxSearch,
		page_size: u64,
	) -> InventoryResult<Page<StorageBox>> {
		let workspace_id = access.workspace_id();
		let page = search.page.max(1);
		let mut query =
			storage_box::Entity::find().filter(storage_box::Column::WorkspaceId.eq(workspace_id));

		query = match search.location {
			LocationFilter::Any => query,
			LocationFilter::Unassigned => query.filter(storage_box::Column::LocationId.is_null()),
			LocationFilter::At(location_id) => {
				self.locations
					.live_location_in(db, workspace_id, location_id)
					.await?;
				query.filter(storage_box::Column::LocationId.eq(location_id))
			}
		};

		if let Some(text) = search.query.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
			let pattern = like_pattern(&storage_box::fold_case(text));
			let like = LikeExpr::new(pattern.clone()).escape('\\');
			query = query.filter(
				Condition::any()
					.add(storage_box::Column::NameFolded.like(like.clone()))
					.add(storage_box::Column::DescriptionFolded.like(like.clone()))
					.add(storage_box::Column::ShortCode.like(like))
					.add(Expr::cust_with_values(
						r#"EXISTS (SELECT 1 FROM json_each("boxes"."tags") WHERE json_each.value LIKE ? ESCAPE ?)"#,
						[pattern, "\\".to_string()],
					)),
			);
		}

		let paginator = query
			.order_by_asc(storage_box::Column::Name)
			.order_by_asc(storage_box::Column::Id)
			.paginate(db, page_size);
		let total_items = paginator.num_items().await?;

		// Pages past the end are empty; this also keeps the offset from overflowing.
		let in_range = (page - 1)
			.checked_mul(page_size)
			.is_some_and(|offset| offset < total_items);
		let items = if in_range {
			paginator
				.fetch_page(page - 1)
				.await?
				.iter()
				.map(storage_box::Model::to_domain)
				.collect::<InventoryResult<Vec<_>>>()?
		} else {
			Vec::new()
		};

		Ok(Page {
			items,
			page,
			page_size,
			total_items,
		})
	}

	async fn box_in<C: ConnectionTrait>(
		&self,
		db: &C,
		workspace_id: Uuid,
		box_id: Uuid,
	) -> InventoryResult<storage_box::Model> {
		storage_box::Entity::find_by_id(box_id)
			.one(db)
			.await?
			.filter(|b| b.workspace_id == workspace_id)
			.ok_or_else(|| InventoryError::not_found(EntityKind::Box, box_id))
	}
}

/// `%text%` with LIKE wildcards in the user text escaped by `\`
fn like_pattern(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len() + 2);
	escaped.push('%');
	for c in text.chars() {
		if matches!(c, '%' | '_' | '\\') {
			escaped.push('\\');
		}
		escaped.push(c);
	}
	escaped.push('%');
	escaped
}
