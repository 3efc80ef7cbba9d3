//! Inventory error taxonomy
//!
//! Every public operation returns [`InventoryResult`]. Errors carry a stable
//! machine-readable [`ErrorCode`] and a human message that never includes
//! storage driver text.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::Role;

/// Kind of entity a lookup failed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
	Workspace,
	Member,
	Location,
	Box,
	QrCode,
}

impl fmt::Display for EntityKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			EntityKind::Workspace => write!(f, "workspace"),
			EntityKind::Member => write!(f, "member"),
			EntityKind::Location => write!(f, "location"),
			EntityKind::Box => write!(f, "box"),
			EntityKind::QrCode => write!(f, "QR code"),
		}
	}
}

/// Inventory operation errors
#[derive(Error, Debug)]
pub enum InventoryError {
	/// The principal has no membership in the workspace (or it doesn't exist)
	#[error("Workspace not found: {workspace_id}")]
	NotAMember { workspace_id: Uuid },

	/// The principal is a member but their role is too weak
	#[error("Role {actual} does not permit this operation (requires {required})")]
	InsufficientRole { required: Role, actual: Role },

	/// Entity missing, soft-deleted, or in another workspace
	#[error("{kind} not found")]
	NotFound { kind: EntityKind, id: Option<Uuid> },

	#[error("Location would exceed the maximum depth of {max}")]
	MaxDepthExceeded { max: usize },

	#[error("A location named '{name}' already exists here")]
	DuplicateSiblingName { name: String },

	#[error("QR code is already assigned to a box")]
	QrCodeAlreadyAssigned { qr_code_id: Uuid },

	#[error("Batch quantity must be between {min} and {max}, got {requested}")]
	InvalidQuantity {
		requested: i64,
		min: usize,
		max: usize,
	},

	/// Operation would leave the workspace without an owner
	#[error("A workspace must keep at least one owner")]
	LastOwnerProtected { workspace_id: Uuid },

	#[error("Invalid {field}: {reason}")]
	InvalidInput { field: &'static str, reason: String },

	/// Storage layer rejected or failed the request
	#[error("Storage is temporarily unavailable")]
	Database(#[from] sea_orm::DbErr),

	#[error("Storage is temporarily unavailable")]
	StorageUnavailable { reason: &'static str },
}

/// Stable machine-readable error codes exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
	NotFound,
	InsufficientRole,
	MaxDepthExceeded,
	DuplicateSiblingName,
	QrCodeAlreadyAssigned,
	InvalidQuantity,
	LastOwnerProtected,
	InvalidInput,
	StorageUnavailable,
}

impl ErrorCode {
	pub fn as_str(&self) -> &'static str {
		match self {
			ErrorCode::NotFound => "not_found",
			ErrorCode::InsufficientRole => "insufficient_role",
			ErrorCode::MaxDepthExceeded => "max_depth_exceeded",
			ErrorCode::DuplicateSiblingName => "duplicate_sibling_name",
			ErrorCode::QrCodeAlreadyAssigned => "qr_code_already_assigned",
			ErrorCode::InvalidQuantity => "invalid_quantity",
			ErrorCode::LastOwnerProtected => "last_owner_protected",
			ErrorCode::InvalidInput => "invalid_input",
			ErrorCode::StorageUnavailable => "storage_unavailable",
		}
	}
}

impl fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl InventoryError {
	pub fn not_found(kind: EntityKind, id: Uuid) -> Self {
		Self::NotFound { kind, id: Some(id) }
	}

	pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
		Self::InvalidInput {
			field,
			reason: reason.into(),
		}
	}

	/// Machine-readable code for this error.
	///
	/// `NotAMember` maps to `not_found`.
	pub fn code(&self) -> ErrorCode {
		match self {
			InventoryError::NotAMember { .. } | InventoryError::NotFound { .. } => {
				ErrorCode::NotFound
			}
			InventoryError::InsufficientRole { .. } => ErrorCode::InsufficientRole,
			InventoryError::MaxDepthExceeded { .. } => ErrorCode::MaxDepthExceeded,
			InventoryError::DuplicateSiblingName { .. } => ErrorCode::DuplicateSiblingName,
			InventoryError::QrCodeAlreadyAssigned { .. } => ErrorCode::QrCodeAlreadyAssigned,
			InventoryError::InvalidQuantity { .. } => ErrorCode::InvalidQuantity,
			InventoryError::LastOwnerProtected { .. } => ErrorCode::LastOwnerProtected,
			InventoryError::InvalidInput { .. } => ErrorCode::InvalidInput,
			InventoryError::Database(_) | InventoryError::StorageUnavailable { .. } => {
				ErrorCode::StorageUnavailable
			}
		}
	}

	/// Message safe to show to an end user
	pub fn public_message(&self) -> String {
		match self {
			InventoryError::NotAMember { .. } => "Not found".to_string(),
			other => other.to_string(),
		}
	}

	/// Only transient storage failures may be retried by callers
	pub fn is_retryable(&self) -> bool {
		self.code() == ErrorCode::StorageUnavailable
	}
}

/// Result type for inventory operations
pub type InventoryResult<T> = Result<T, InventoryError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn not_a_member_is_reported_as_not_found() {
		let err = InventoryError::NotAMember {
			workspace_id: Uuid::new_v4(),
		};

		assert_eq!(err.code(), ErrorCode::NotFound);
		assert_eq!(err.public_message(), "Not found");
		assert!(!err.is_retryable());
	}

	#[test]
	fn storage_errors_hide_driver_text() {
		let err = InventoryError::from(sea_orm::DbErr::Custom(
			"disk I/O error at page 42".to_string(),
		));

		assert_eq!(err.code(), ErrorCode::StorageUnavailable);
		assert!(err.is_retryable());
		assert!(!err.public_message().contains("page 42"));
	}

	#[test]
	fn error_codes_are_snake_case() {
		let json = serde_json::to_string(&ErrorCode::QrCodeAlreadyAssigned).unwrap();
		assert_eq!(json, "\"qr_code_already_assigned\"");
		assert_eq!(
			ErrorCode::QrCodeAlreadyAssigned.as_str(),
			"qr_code_already_assigned"
		);
	}
}
