//! QR code ledger
//!
//! Codes are created in batches and never deleted outside workspace
//! teardown. The only transitions are `generated -> assigned` (a box claims
//! the code) and `assigned -> generated` (the box lets it go), both driven
//! by the box registry inside its own transaction.

use chrono::Utc;
use sea_orm::{
	ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{is_unique_violation, WorkspaceAccess};
use crate::{
	domain::{
		short_code::{self, MAX_CODE_ATTEMPTS, QR_CODE_LEN},
		QrCode, QrStatus, RandomShortCodes, ShortCodeSource, MAX_BATCH_QUANTITY,
		MIN_BATCH_QUANTITY,
	},
	error::{EntityKind, InventoryError, InventoryResult},
	infra::db::entities::{qr_code, QrCodeActive},
};

#[derive(Clone)]
pub struct QrCodeLedger {
	codes: Arc<dyn ShortCodeSource>,
}

impl Default for QrCodeLedger {
	fn default() -> Self {
		Self::new(Arc::new(RandomShortCodes))
	}
}

impl std::fmt::Debug for QrCodeLedger {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("QrCodeLedger").finish_non_exhaustive()
	}
}

impl QrCodeLedger {
	pub fn new(codes: Arc<dyn ShortCodeSource>) -> Self {
		Self { codes }
	}

	/// Insert `quantity` fresh codes; short-code collisions are retried per code
	pub async fn generate_batch<C: ConnectionTrait>(
		&self,
		db: &C,
		access: &WorkspaceAccess,
		quantity: i64,
	) -> InventoryResult<Vec<QrCode>> {
		let in_range = usize::try_from(quantity)
			.map(|q| (MIN_BATCH_QUANTITY..=MAX_BATCH_QUANTITY).contains(&q))
			.unwrap_or(false);
		if !in_range {
			return Err(InventoryError::InvalidQuantity {
				requested: quantity,
				min: MIN_BATCH_QUANTITY,
				max: MAX_BATCH_QUANTITY,
			});
		}

		let mut generated = Vec::with_capacity(quantity as usize);
		for _ in 0..quantity {
			let model = self.insert_unique(db, access.workspace_id()).await?;
			generated.push(model.to_domain()?);
		}

		info!(
			workspace_id = %access.workspace_id(),
			quantity,
			"Generated QR code batch"
		);
		Ok(generated)
	}

	async fn insert_unique<C: ConnectionTrait>(
		&self,
		db: &C,
		workspace_id: Uuid,
	) -> InventoryResult<qr_code::Model> {
		for attempt in 1..=MAX_CODE_ATTEMPTS {
			let now = Utc::now();
			let candidate = self.codes.next_code(QR_CODE_LEN);
			let result = QrCodeActive {
				id: Set(Uuid::new_v4()),
				workspace_id: Set(workspace_id),
				short_code: Set(candidate.clone()),
				status: Set(QrStatus::Generated),
				box_id: Set(None),
				created_at: Set(now),
				updated_at: Set(now),
			}
			.insert(db)
			.await;

			match result {
				Ok(model) => return Ok(model),
				Err(e) if is_unique_violation(&e) => {
					debug!(attempt, code = %candidate, "QR short code collision, retrying");
				}
				Err(e) => return Err(e.into()),
			}
		}

		warn!(%workspace_id, "Exhausted QR short code attempts");
		Err(InventoryError::StorageUnavailable {
			reason: "could not allocate a unique short code",
		})
	}

	/// Global lookup by printed short code. Callers authorize against the
	/// returned code's workspace before exposing it.
	pub async fn resolve<C: ConnectionTrait>(
		&self,
		db: &C,
		raw_short_code: &str,
	) -> InventoryResult<QrCode> {
		let code = short_code::normalize(raw_short_code);
		if !short_code::is_well_formed(&code, QR_CODE_LEN) {
			return Err(InventoryError::NotFound {
				kind: EntityKind::QrCode,
				id: None,
			});
		}

		qr_code::Entity::find()
			.filter(qr_code::Column::ShortCode.eq(code))
			.one(db)
			.await?
			.ok_or(InventoryError::NotFound {
				kind: EntityKind::QrCode,
				id: None,
			})?
			.to_domain()
	}

	pub async fn list<C: ConnectionTrait>(
		&self,
		db: &C,
		access: &WorkspaceAccess,
		status: Option<QrStatus>,
	) -> InventoryResult<Vec<QrCode>> {
		let mut query = qr_code::Entity::find()
			.filter(qr_code::Column::WorkspaceId.eq(access.workspace_id()));
		if let Some(status) = status {
			query = query.filter(qr_code::Column::Status.eq(status));
		}

		query
			.order_by_asc(qr_code::Column::CreatedAt)
			.order_by_asc(qr_code::Column::ShortCode)
			.all(db)
			.await?
			.iter()
			.map(qr_code::Model::to_domain)
			.collect()
	}

	/// The code currently bound to `box_id`, if any
	pub(crate) async fn bound_to<C: ConnectionTrait>(
		&self,
		db: &C,
		workspace_id: Uuid,
		box_id: Uuid,
	) -> InventoryResult<Option<QrCode>> {
		qr_code::Entity::find()
			.filter(qr_code::Column::WorkspaceId.eq(workspace_id))
			.filter(qr_code::Column::BoxId.eq(box_id))
			.one(db)
			.await?
			.map(|m| m.to_domain())
			.transpose()
	}

	/// `generated -> assigned`.
	///
	/// A conditional update; zero affected rows means someone else holds the
	/// code, whether we lost a race or read a stale state.
	pub(crate) async fn assign<C: ConnectionTrait>(
		&self,
		db: &C,
		workspace_id: Uuid,
		qr_code_id: Uuid,
		box_id: Uuid,
	) -> InventoryResult<()> {
		let exists = qr_code::Entity::find_by_id(qr_code_id)
			.one(db)
			.await?
			.is_some_and(|c| c.workspace_id == workspace_id);
		if !exists {
			return Err(InventoryError::not_found(EntityKind::QrCode, qr_code_id));
		}

		let claimed = qr_code::Entity::update_many()
			.set(QrCodeActive {
				status: Set(QrStatus::Assigned),
				box_id: Set(Some(box_id)),
				updated_at: Set(Utc::now()),
				..Default::default()
			})
			.filter(qr_code::Column::Id.eq(qr_code_id))
			.filter(qr_code::Column::WorkspaceId.eq(workspace_id))
			.filter(qr_code::Column::Status.eq(QrStatus::Generated))
			.exec(db)
			.await
			.map_err(|e| {
				if is_unique_violation(&e) {
					InventoryError::QrCodeAlreadyAssigned { qr_code_id }
				} else {
					e.into()
				}
			})?
			.rows_affected;

		if claimed == 0 {
			warn!(%qr_code_id, %box_id, "QR code already claimed");
			return Err(InventoryError::QrCodeAlreadyAssigned { qr_code_id });
		}

		debug!(%qr_code_id, %box_id, "Assigned QR code");
		Ok(())
	}

	/// `assigned -> generated` for whatever code `box_id` holds; a box with
	/// no code is a no-op. Returns the released code id.
	pub(crate) async fn release<C: ConnectionTrait>(
		&self,
		db: &C,
		workspace_id: Uuid,
		box_id: Uuid,
	) -> InventoryResult<Option<Uuid>> {
		let Some(bound) = self.bound_to(db, workspace_id, box_id).await? else {
			return Ok(None);
		};

		qr_code::Entity::update_many()
			.set(QrCodeActive {
				status: Set(QrStatus::Generated),
				box_id: Set(None),
				updated_at: Set(Utc::now()),
				..Default::default()
			})
			.filter(qr_code::Column::Id.eq(bound.id))
			.filter(qr_code::Column::BoxId.eq(box_id))
			.exec(db)
			.await?;

		debug!(qr_code_id = %bound.id, %box_id, "Released QR code");
		Ok(Some(bound.id))
	}
}
