//! Inventory services
//!
//! Components take a [`WorkspaceAccess`] issued by the [`TenantGuard`] and a
//! connection (usually an open transaction). Only [`InventoryService`] opens
//! transactions and talks to the guard.

use sea_orm::{DbErr, SqlErr};

pub mod audit;
pub mod boxes;
pub mod guard;
pub mod inventory;
pub mod locations;
pub mod qr_codes;
pub mod workspaces;

pub use audit::{AuditEntry, AuditTrail};
pub use boxes::BoxRegistry;
pub use guard::{TenantGuard, WorkspaceAccess};
pub use inventory::InventoryService;
pub use locations::{LocationHierarchy, SoftDeleteOutcome};
pub use qr_codes::QrCodeLedger;
pub use workspaces::WorkspaceDirectory;

/// True when the store rejected a write on a unique constraint
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
	matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
