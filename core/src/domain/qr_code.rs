//! Pre-printable QR code identifiers

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Smallest and largest accepted batch sizes
pub const MIN_BATCH_QUANTITY: usize = 1;
pub const MAX_BATCH_QUANTITY: usize = 100;

/// Stored status column. Kept in lockstep with the box reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum QrStatus {
	#[sea_orm(string_value = "generated")]
	Generated,
	#[sea_orm(string_value = "assigned")]
	Assigned,
}

/// Lifecycle of a QR code: `Generated -> Assigned -> Generated`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QrState {
	Generated,
	Assigned { box_id: Uuid },
}

impl QrState {
	pub fn status(&self) -> QrStatus {
		match self {
			QrState::Generated => QrStatus::Generated,
			QrState::Assigned { .. } => QrStatus::Assigned,
		}
	}

	pub fn box_id(&self) -> Option<Uuid> {
		match self {
			QrState::Generated => None,
			QrState::Assigned { box_id } => Some(*box_id),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrCode {
	pub id: Uuid,
	pub workspace_id: Uuid,
	pub short_code: String,
	pub state: QrState,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl QrCode {
	pub fn status(&self) -> QrStatus {
		self.state.status()
	}

	pub fn box_id(&self) -> Option<Uuid> {
		self.state.box_id()
	}
}
